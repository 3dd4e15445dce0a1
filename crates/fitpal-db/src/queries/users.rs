//! Queries for `users` and `linked_accounts`.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{LinkedAccount, User};

pub async fn insert_user(pool: &PgPool, username: &str, email: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email) VALUES ($1, $2) RETURNING *",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert user {username:?}"))?;

    Ok(user)
}

pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user")?;

    Ok(user)
}

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user by username")?;

    Ok(user)
}

/// Delete a user and, through cascades, everything they own.
pub async fn delete_user(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete user")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("user {id} not found");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Linked accounts
// ---------------------------------------------------------------------------

/// Insert or refresh the credentials a user has linked for `provider`.
pub async fn upsert_linked_account(
    pool: &PgPool,
    user_id: Uuid,
    provider: &str,
    access_token: &str,
    refresh_token: Option<&str>,
) -> Result<LinkedAccount> {
    let account = sqlx::query_as::<_, LinkedAccount>(
        "INSERT INTO linked_accounts (user_id, provider, access_token, refresh_token) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id, provider) DO UPDATE \
         SET access_token = EXCLUDED.access_token, \
             refresh_token = COALESCE(EXCLUDED.refresh_token, linked_accounts.refresh_token), \
             linked_at = now() \
         RETURNING *",
    )
    .bind(user_id)
    .bind(provider)
    .bind(access_token)
    .bind(refresh_token)
    .fetch_one(pool)
    .await
    .context("failed to upsert linked account")?;

    Ok(account)
}

pub async fn get_linked_account(
    pool: &PgPool,
    user_id: Uuid,
    provider: &str,
) -> Result<Option<LinkedAccount>> {
    let account = sqlx::query_as::<_, LinkedAccount>(
        "SELECT * FROM linked_accounts WHERE user_id = $1 AND provider = $2",
    )
    .bind(user_id)
    .bind(provider)
    .fetch_optional(pool)
    .await
    .context("failed to fetch linked account")?;

    Ok(account)
}

/// Remove a linked account. Returns whether a row was deleted.
pub async fn delete_linked_account(pool: &PgPool, user_id: Uuid, provider: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM linked_accounts WHERE user_id = $1 AND provider = $2")
        .bind(user_id)
        .bind(provider)
        .execute(pool)
        .await
        .context("failed to delete linked account")?;

    Ok(result.rows_affected() > 0)
}
