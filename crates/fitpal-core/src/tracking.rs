//! Completion logging for exercises, meals and water.
//!
//! Every operation requires the user's profile to have tracking enabled,
//! and only accepts items that belong to one of the user's own plans.

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use fitpal_db::models::{MealTracking, Profile, WaterTracking, WorkoutTracking};
use fitpal_db::queries::{plan_items, tracking as tracking_queries};

use crate::error::{FitpalError, Result};
use crate::profile::{calculate_calories_burned, load_profile};

#[derive(Debug, Clone)]
pub struct WorkoutLog {
    pub exercise_id: Uuid,
    pub date_completed: NaiveDate,
    pub sets_completed: i32,
    /// Estimated from the exercise and profile when `None`.
    pub calories_burned: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MealLog {
    pub meal_id: Uuid,
    pub date_completed: NaiveDate,
    pub portion_consumed: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WaterLog {
    pub nutrition_day_id: Uuid,
    pub date: NaiveDate,
    pub litres_consumed: f64,
    pub notes: Option<String>,
}

async fn tracking_profile(pool: &PgPool, user_id: Uuid) -> Result<Profile> {
    let profile = load_profile(pool, user_id).await?;
    if !profile.tracking_enabled {
        return Err(FitpalError::validation("tracking is disabled"));
    }
    Ok(profile)
}

// ---------------------------------------------------------------------------
// Workouts
// ---------------------------------------------------------------------------

pub async fn log_workout(pool: &PgPool, user_id: Uuid, log: &WorkoutLog) -> Result<WorkoutTracking> {
    let profile = tracking_profile(pool, user_id).await?;
    if log.sets_completed < 0 {
        return Err(FitpalError::validation("sets completed must not be negative"));
    }
    if log.calories_burned.is_some_and(|c| c < 0) {
        return Err(FitpalError::validation("calories burned must not be negative"));
    }

    let exercise = plan_items::get_exercise_for_user(pool, user_id, log.exercise_id)
        .await?
        .ok_or_else(|| FitpalError::not_found(format!("exercise {}", log.exercise_id)))?;

    let calories_burned = log.calories_burned.unwrap_or_else(|| {
        calculate_calories_burned(
            Some(exercise.met_value),
            profile.current_weight,
            Some(exercise.duration_mins),
        )
    });

    let row = tracking_queries::insert_workout_tracking(
        pool,
        &tracking_queries::NewWorkoutTracking {
            exercise_id: exercise.id,
            user_id,
            date_completed: log.date_completed,
            sets_completed: log.sets_completed,
            calories_burned,
            notes: log.notes.as_deref(),
        },
    )
    .await?
    .ok_or_else(|| {
        FitpalError::conflict(format!(
            "exercise {} is already tracked for {}",
            exercise.id, log.date_completed
        ))
    })?;

    info!(tracking_id = %row.id, exercise_id = %exercise.id, calories_burned, "workout tracked");
    Ok(row)
}

pub async fn list_workout_tracking(
    pool: &PgPool,
    user_id: Uuid,
    date: Option<NaiveDate>,
) -> Result<Vec<WorkoutTracking>> {
    tracking_profile(pool, user_id).await?;
    Ok(tracking_queries::list_workout_tracking(pool, user_id, date).await?)
}

pub async fn delete_workout_tracking(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<()> {
    tracking_profile(pool, user_id).await?;
    if !tracking_queries::delete_workout_tracking(pool, user_id, id).await? {
        return Err(FitpalError::not_found(format!("workout tracking {id}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Meals
// ---------------------------------------------------------------------------

pub async fn log_meal(pool: &PgPool, user_id: Uuid, log: &MealLog) -> Result<MealTracking> {
    tracking_profile(pool, user_id).await?;
    if !(log.portion_consumed >= 0.0) {
        return Err(FitpalError::validation("portion consumed must not be negative"));
    }

    let meal = plan_items::get_meal_for_user(pool, user_id, log.meal_id)
        .await?
        .ok_or_else(|| FitpalError::not_found(format!("meal {}", log.meal_id)))?;

    let row = tracking_queries::insert_meal_tracking(
        pool,
        &tracking_queries::NewMealTracking {
            meal_id: meal.id,
            user_id,
            date_completed: log.date_completed,
            portion_consumed: log.portion_consumed,
            notes: log.notes.as_deref(),
        },
    )
    .await?
    .ok_or_else(|| {
        FitpalError::conflict(format!(
            "meal {} is already tracked for {}",
            meal.id, log.date_completed
        ))
    })?;

    info!(tracking_id = %row.id, meal_id = %meal.id, "meal tracked");
    Ok(row)
}

pub async fn list_meal_tracking(
    pool: &PgPool,
    user_id: Uuid,
    date: Option<NaiveDate>,
) -> Result<Vec<MealTracking>> {
    tracking_profile(pool, user_id).await?;
    Ok(tracking_queries::list_meal_tracking(pool, user_id, date).await?)
}

pub async fn delete_meal_tracking(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<()> {
    tracking_profile(pool, user_id).await?;
    if !tracking_queries::delete_meal_tracking(pool, user_id, id).await? {
        return Err(FitpalError::not_found(format!("meal tracking {id}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Water
// ---------------------------------------------------------------------------

/// Water entries accumulate; several per day are expected.
pub async fn log_water(pool: &PgPool, user_id: Uuid, log: &WaterLog) -> Result<WaterTracking> {
    tracking_profile(pool, user_id).await?;
    if !(log.litres_consumed > 0.0) {
        return Err(FitpalError::validation("litres consumed must be positive"));
    }

    let day = plan_items::get_nutrition_day_for_user(pool, user_id, log.nutrition_day_id)
        .await?
        .ok_or_else(|| FitpalError::not_found(format!("nutrition day {}", log.nutrition_day_id)))?;

    let row = tracking_queries::insert_water_tracking(
        pool,
        &tracking_queries::NewWaterTracking {
            nutrition_day_id: day.id,
            user_id,
            date: log.date,
            litres_consumed: log.litres_consumed,
            notes: log.notes.as_deref(),
        },
    )
    .await?;

    info!(tracking_id = %row.id, nutrition_day_id = %day.id, litres = log.litres_consumed, "water tracked");
    Ok(row)
}

pub async fn list_water_tracking(
    pool: &PgPool,
    user_id: Uuid,
    date: Option<NaiveDate>,
) -> Result<Vec<WaterTracking>> {
    tracking_profile(pool, user_id).await?;
    Ok(tracking_queries::list_water_tracking(pool, user_id, date).await?)
}

pub async fn delete_water_tracking(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<()> {
    tracking_profile(pool, user_id).await?;
    if !tracking_queries::delete_water_tracking(pool, user_id, id).await? {
        return Err(FitpalError::not_found(format!("water tracking {id}")));
    }
    Ok(())
}
