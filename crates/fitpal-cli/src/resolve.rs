//! Argument resolution: the acting user, entity IDs and clock times.

use anyhow::{Context, Result, bail};
use chrono::NaiveTime;
use sqlx::PgPool;
use uuid::Uuid;

use fitpal_db::models::User;
use fitpal_db::queries::users;

use crate::config::USER_ENV;

/// Parse an entity ID given on the command line.
pub fn parse_id(input: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(input.trim()).with_context(|| format!("invalid {what} ID: {input:?}"))
}

/// Look up the acting user by UUID or, failing that, by username.
pub async fn resolve_user(pool: &PgPool, input: Option<&str>) -> Result<User> {
    let Some(input) = input else {
        bail!("no user given; pass --user <name|id> or set {USER_ENV}");
    };

    let found = match Uuid::parse_str(input) {
        Ok(id) => users::get_user(pool, id).await?,
        Err(_) => users::get_user_by_username(pool, input).await?,
    };
    found.with_context(|| format!("user {input:?} not found"))
}

/// Clap value parser for `HH:MM` or `HH:MM:SS`.
pub fn parse_time(input: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|_| format!("invalid time {input:?}, expected HH:MM"))
}
