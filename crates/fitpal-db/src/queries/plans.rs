//! Queries for the `fitness_plans` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{FitnessPlan, Goal};

/// Values for a new plan row.
#[derive(Debug, Clone)]
pub struct NewPlan<'a> {
    pub profile_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub goal_at_creation: Option<Goal>,
    pub ai_prompt_text: &'a str,
    pub ai_response_raw: &'a serde_json::Value,
}

/// Insert a plan row. Accepts any executor so ingestion can run it inside
/// its transaction.
pub async fn insert_plan<'e>(executor: impl PgExecutor<'e>, new: &NewPlan<'_>) -> Result<FitnessPlan> {
    let plan = sqlx::query_as::<_, FitnessPlan>(
        "INSERT INTO fitness_plans \
             (profile_id, start_date, end_date, goal_at_creation, ai_prompt_text, ai_response_raw) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(new.profile_id)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.goal_at_creation)
    .bind(new.ai_prompt_text)
    .bind(new.ai_response_raw)
    .fetch_one(executor)
    .await
    .context("failed to insert plan")?;

    Ok(plan)
}

pub async fn get_plan(pool: &PgPool, id: Uuid) -> Result<Option<FitnessPlan>> {
    let plan = sqlx::query_as::<_, FitnessPlan>("SELECT * FROM fitness_plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan")?;

    Ok(plan)
}

/// Fetch a plan only if it belongs to `user_id`.
pub async fn get_plan_for_user(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<FitnessPlan>> {
    let plan = sqlx::query_as::<_, FitnessPlan>(
        "SELECT fp.* FROM fitness_plans fp \
         JOIN profiles p ON p.id = fp.profile_id \
         WHERE fp.id = $1 AND p.user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch plan for user")?;

    Ok(plan)
}

/// All plans of a profile, newest start date first.
pub async fn list_plans_for_profile(pool: &PgPool, profile_id: Uuid) -> Result<Vec<FitnessPlan>> {
    let plans = sqlx::query_as::<_, FitnessPlan>(
        "SELECT * FROM fitness_plans WHERE profile_id = $1 \
         ORDER BY start_date DESC, created_at DESC",
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await
    .context("failed to list plans")?;

    Ok(plans)
}

/// Plans of a profile whose range intersects `[start, end]`, ordered by
/// start date.
pub async fn plans_overlapping(
    pool: &PgPool,
    profile_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<FitnessPlan>> {
    let plans = sqlx::query_as::<_, FitnessPlan>(
        "SELECT * FROM fitness_plans \
         WHERE profile_id = $1 AND start_date <= $3 AND end_date >= $2 \
         ORDER BY start_date, created_at",
    )
    .bind(profile_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("failed to query overlapping plans")?;

    Ok(plans)
}

/// Delete a plan owned by `user_id`. Returns false if no such plan exists.
pub async fn delete_plan_for_user(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM fitness_plans fp USING profiles p \
         WHERE fp.id = $1 AND p.id = fp.profile_id AND p.user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await
    .context("failed to delete plan")?;

    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Calendar bookkeeping
// ---------------------------------------------------------------------------

pub async fn set_external_calendar_id(pool: &PgPool, id: Uuid, calendar_id: &str) -> Result<()> {
    let result = sqlx::query("UPDATE fitness_plans SET external_calendar_id = $2 WHERE id = $1")
        .bind(id)
        .bind(calendar_id)
        .execute(pool)
        .await
        .context("failed to store external calendar id")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("plan {id} not found");
    }

    Ok(())
}

pub async fn set_workout_added(pool: &PgPool, id: Uuid, added: bool) -> Result<()> {
    sqlx::query("UPDATE fitness_plans SET workout_added_to_calendar = $2 WHERE id = $1")
        .bind(id)
        .bind(added)
        .execute(pool)
        .await
        .context("failed to update workout calendar flag")?;

    Ok(())
}

pub async fn set_nutrition_added(pool: &PgPool, id: Uuid, added: bool) -> Result<()> {
    sqlx::query("UPDATE fitness_plans SET nutrition_added_to_calendar = $2 WHERE id = $1")
        .bind(id)
        .bind(added)
        .execute(pool)
        .await
        .context("failed to update nutrition calendar flag")?;

    Ok(())
}

/// The earliest-created plan of the user with either calendar flag set.
pub async fn first_synced_plan_for_user(pool: &PgPool, user_id: Uuid) -> Result<Option<FitnessPlan>> {
    let plan = sqlx::query_as::<_, FitnessPlan>(
        "SELECT fp.* FROM fitness_plans fp \
         JOIN profiles p ON p.id = fp.profile_id \
         WHERE p.user_id = $1 \
           AND (fp.workout_added_to_calendar OR fp.nutrition_added_to_calendar) \
         ORDER BY fp.created_at, fp.id \
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to find synced plan")?;

    Ok(plan)
}

/// Forget every calendar reference held by the user's plans, workout days
/// and meals, in one transaction.
pub async fn clear_calendar_state_for_user(pool: &PgPool, user_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query(
        "UPDATE fitness_plans fp \
         SET workout_added_to_calendar = false, \
             nutrition_added_to_calendar = false, \
             external_calendar_id = NULL \
         FROM profiles p \
         WHERE p.id = fp.profile_id AND p.user_id = $1",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("failed to clear plan calendar state")?;

    sqlx::query(
        "UPDATE workout_days wd SET external_event_id = NULL \
         FROM fitness_plans fp JOIN profiles p ON p.id = fp.profile_id \
         WHERE fp.id = wd.plan_id AND p.user_id = $1 AND wd.external_event_id IS NOT NULL",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("failed to clear workout event ids")?;

    sqlx::query(
        "UPDATE meals m SET external_event_id = NULL \
         FROM nutrition_days nd \
         JOIN fitness_plans fp ON fp.id = nd.plan_id \
         JOIN profiles p ON p.id = fp.profile_id \
         WHERE nd.id = m.nutrition_day_id AND p.user_id = $1 AND m.external_event_id IS NOT NULL",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("failed to clear meal event ids")?;

    tx.commit().await.context("failed to commit transaction")?;
    Ok(())
}
