//! Shared helpers for fitpal integration tests.
//!
//! Every test gets its own database inside one PostgreSQL server per test
//! binary. Set `FITPAL_TEST_PG_URL` (server root, no database name) to reuse
//! an already running server; otherwise a container is started through
//! testcontainers on first use.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use fitpal_db::models::{GOOGLE_PROVIDER, Goal, LinkedAccount, Profile, User};
use fitpal_db::pool;
use fitpal_db::queries::{profiles, users};

struct SharedPg {
    base_url: String,
    /// Keeps the container alive for the life of the test binary.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var("FITPAL_TEST_PG_URL") {
        return SharedPg {
            base_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("failed to start PostgreSQL container");
    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedPg {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

pub async fn pg_url() -> &'static str {
    &SHARED_PG.get_or_init(init_shared_pg).await.base_url
}

async fn maintenance_pool(base_url: &str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&format!("{base_url}/postgres"))
        .await
        .expect("failed to connect to maintenance database")
}

/// Create a uniquely named database with all migrations applied.
///
/// Returns `(pool, db_name)`; pass `db_name` to [`drop_test_db`] when done.
pub async fn create_test_db() -> (PgPool, String) {
    let base_url = pg_url().await;
    let db_name = format!("fitpal_test_{}", Uuid::new_v4().simple());

    let maint = maintenance_pool(base_url).await;
    maint
        .execute(format!("CREATE DATABASE {db_name}").as_str())
        .await
        .unwrap_or_else(|e| panic!("failed to create test database {db_name}: {e}"));
    maint.close().await;

    let test_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&format!("{base_url}/{db_name}"))
        .await
        .unwrap_or_else(|e| panic!("failed to connect to test database {db_name}: {e}"));

    pool::run_migrations(&test_pool)
        .await
        .expect("migrations should succeed");

    (test_pool, db_name)
}

/// Drop a database made by [`create_test_db`], terminating stray connections.
pub async fn drop_test_db(db_name: &str) {
    let maint = maintenance_pool(pg_url().await).await;

    let terminate = format!(
        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
         WHERE datname = '{db_name}' AND pid <> pg_backend_pid()"
    );
    let _ = maint.execute(terminate.as_str()).await;
    let _ = maint
        .execute(format!("DROP DATABASE IF EXISTS {db_name}").as_str())
        .await;
    maint.close().await;
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn seed_user(pool: &PgPool, username: &str) -> User {
    users::insert_user(pool, username, &format!("{username}@example.com"))
        .await
        .expect("seed user")
}

/// A 70 kg, 175 cm user aiming for weight loss, with default toggles.
pub async fn seed_user_with_profile(pool: &PgPool, username: &str) -> (User, Profile) {
    let user = seed_user(pool, username).await;
    let fields = profiles::ProfileFields {
        age: Some(29),
        current_weight: Some(70.0),
        height_cm: Some(175),
        goal: Some(Goal::WeightLoss),
        ..Default::default()
    };
    let profile = profiles::insert_profile(pool, user.id, &fields, false)
        .await
        .expect("seed profile");
    (user, profile)
}

/// Link a Google account with a dummy access token.
pub async fn link_google(pool: &PgPool, user_id: Uuid) -> LinkedAccount {
    users::upsert_linked_account(pool, user_id, GOOGLE_PROVIDER, "test-access-token", None)
        .await
        .expect("seed linked account")
}
