//! Queries for `workout_tracking`, `meal_tracking` and `water_tracking`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{MealTracking, WaterTracking, WorkoutTracking};

// ---------------------------------------------------------------------------
// Workout tracking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewWorkoutTracking<'a> {
    pub exercise_id: Uuid,
    pub user_id: Uuid,
    pub date_completed: NaiveDate,
    pub sets_completed: i32,
    pub calories_burned: i64,
    pub notes: Option<&'a str>,
}

/// Insert a workout completion. Returns `None` if the user already logged
/// this exercise on that date.
pub async fn insert_workout_tracking(
    pool: &PgPool,
    new: &NewWorkoutTracking<'_>,
) -> Result<Option<WorkoutTracking>> {
    let row = sqlx::query_as::<_, WorkoutTracking>(
        "INSERT INTO workout_tracking \
             (exercise_id, user_id, date_completed, sets_completed, calories_burned, notes) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (exercise_id, user_id, date_completed) DO NOTHING \
         RETURNING *",
    )
    .bind(new.exercise_id)
    .bind(new.user_id)
    .bind(new.date_completed)
    .bind(new.sets_completed)
    .bind(new.calories_burned)
    .bind(new.notes)
    .fetch_optional(pool)
    .await
    .context("failed to insert workout tracking")?;

    Ok(row)
}

pub async fn list_workout_tracking(
    pool: &PgPool,
    user_id: Uuid,
    date: Option<NaiveDate>,
) -> Result<Vec<WorkoutTracking>> {
    let rows = sqlx::query_as::<_, WorkoutTracking>(
        "SELECT * FROM workout_tracking \
         WHERE user_id = $1 AND ($2::date IS NULL OR date_completed = $2) \
         ORDER BY date_completed DESC, created_at DESC",
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(pool)
    .await
    .context("failed to list workout tracking")?;

    Ok(rows)
}

pub async fn delete_workout_tracking(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM workout_tracking WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to delete workout tracking")?;

    Ok(result.rows_affected() > 0)
}

/// Number of the user's workout tracking rows against a workout day's
/// exercises, whatever date they were logged for.
pub async fn count_workout_tracking_for_day(
    pool: &PgPool,
    user_id: Uuid,
    workout_day_id: Uuid,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM workout_tracking wt \
         JOIN exercises e ON e.id = wt.exercise_id \
         WHERE e.workout_day_id = $1 AND wt.user_id = $2",
    )
    .bind(workout_day_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("failed to count workout tracking")?;

    Ok(count)
}

// ---------------------------------------------------------------------------
// Meal tracking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewMealTracking<'a> {
    pub meal_id: Uuid,
    pub user_id: Uuid,
    pub date_completed: NaiveDate,
    pub portion_consumed: f64,
    pub notes: Option<&'a str>,
}

/// Insert a meal completion. Returns `None` on a duplicate (meal, user, date).
pub async fn insert_meal_tracking(
    pool: &PgPool,
    new: &NewMealTracking<'_>,
) -> Result<Option<MealTracking>> {
    let row = sqlx::query_as::<_, MealTracking>(
        "INSERT INTO meal_tracking (meal_id, user_id, date_completed, portion_consumed, notes) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (meal_id, user_id, date_completed) DO NOTHING \
         RETURNING *",
    )
    .bind(new.meal_id)
    .bind(new.user_id)
    .bind(new.date_completed)
    .bind(new.portion_consumed)
    .bind(new.notes)
    .fetch_optional(pool)
    .await
    .context("failed to insert meal tracking")?;

    Ok(row)
}

pub async fn list_meal_tracking(
    pool: &PgPool,
    user_id: Uuid,
    date: Option<NaiveDate>,
) -> Result<Vec<MealTracking>> {
    let rows = sqlx::query_as::<_, MealTracking>(
        "SELECT * FROM meal_tracking \
         WHERE user_id = $1 AND ($2::date IS NULL OR date_completed = $2) \
         ORDER BY date_completed DESC, created_at DESC",
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(pool)
    .await
    .context("failed to list meal tracking")?;

    Ok(rows)
}

pub async fn delete_meal_tracking(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM meal_tracking WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to delete meal tracking")?;

    Ok(result.rows_affected() > 0)
}

/// Number of the user's meal tracking rows against a nutrition day's meals,
/// whatever date they were logged for.
pub async fn count_meal_tracking_for_day(
    pool: &PgPool,
    user_id: Uuid,
    nutrition_day_id: Uuid,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM meal_tracking mt \
         JOIN meals m ON m.id = mt.meal_id \
         WHERE m.nutrition_day_id = $1 AND mt.user_id = $2",
    )
    .bind(nutrition_day_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("failed to count meal tracking")?;

    Ok(count)
}

// ---------------------------------------------------------------------------
// Water tracking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewWaterTracking<'a> {
    pub nutrition_day_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub litres_consumed: f64,
    pub notes: Option<&'a str>,
}

pub async fn insert_water_tracking(pool: &PgPool, new: &NewWaterTracking<'_>) -> Result<WaterTracking> {
    let row = sqlx::query_as::<_, WaterTracking>(
        "INSERT INTO water_tracking (nutrition_day_id, user_id, date, litres_consumed, notes) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.nutrition_day_id)
    .bind(new.user_id)
    .bind(new.date)
    .bind(new.litres_consumed)
    .bind(new.notes)
    .fetch_one(pool)
    .await
    .context("failed to insert water tracking")?;

    Ok(row)
}

pub async fn list_water_tracking(
    pool: &PgPool,
    user_id: Uuid,
    date: Option<NaiveDate>,
) -> Result<Vec<WaterTracking>> {
    let rows = sqlx::query_as::<_, WaterTracking>(
        "SELECT * FROM water_tracking \
         WHERE user_id = $1 AND ($2::date IS NULL OR date = $2) \
         ORDER BY date DESC, created_at DESC",
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(pool)
    .await
    .context("failed to list water tracking")?;

    Ok(rows)
}

pub async fn delete_water_tracking(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM water_tracking WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to delete water tracking")?;

    Ok(result.rows_affected() > 0)
}

/// Total litres the user logged against a nutrition day.
pub async fn sum_water_for_day(pool: &PgPool, user_id: Uuid, nutrition_day_id: Uuid) -> Result<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(litres_consumed), 0)::float8 FROM water_tracking \
         WHERE nutrition_day_id = $1 AND user_id = $2",
    )
    .bind(nutrition_day_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("failed to sum water tracking")?;

    Ok(total)
}
