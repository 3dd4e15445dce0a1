//! Linked external accounts and the post-authentication reconcile hook.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use fitpal_db::models::{GOOGLE_PROVIDER, LinkedAccount};
use fitpal_db::queries::{profiles as profile_queries, users as user_queries};

use crate::error::{FitpalError, Result};

/// Store Google credentials for `user_id` and bring the profile flag in
/// line with them.
pub async fn link_google_account(
    pool: &PgPool,
    user_id: Uuid,
    access_token: &str,
    refresh_token: Option<&str>,
) -> Result<LinkedAccount> {
    if access_token.trim().is_empty() {
        return Err(FitpalError::validation("access token must not be empty"));
    }
    if user_queries::get_user(pool, user_id).await?.is_none() {
        return Err(FitpalError::not_found(format!("user {user_id}")));
    }

    let account =
        user_queries::upsert_linked_account(pool, user_id, GOOGLE_PROVIDER, access_token, refresh_token)
            .await?;
    info!(%user_id, provider = GOOGLE_PROVIDER, "linked account stored");

    reconcile_external_link(pool, user_id).await?;
    Ok(account)
}

/// Remove the Google credentials of `user_id`. Returns whether any existed.
pub async fn unlink_google_account(pool: &PgPool, user_id: Uuid) -> Result<bool> {
    let removed = user_queries::delete_linked_account(pool, user_id, GOOGLE_PROVIDER).await?;
    reconcile_external_link(pool, user_id).await?;
    Ok(removed)
}

/// Set `connected_to_google_account` to whether a Google linked account
/// exists. Call after every sign-in. Returns the new flag value; a user
/// without a profile is left untouched.
pub async fn reconcile_external_link(pool: &PgPool, user_id: Uuid) -> Result<bool> {
    let connected = user_queries::get_linked_account(pool, user_id, GOOGLE_PROVIDER)
        .await?
        .is_some();
    if profile_queries::set_google_connected(pool, user_id, connected).await? {
        info!(%user_id, connected, "google connection flag reconciled");
    }
    Ok(connected)
}
