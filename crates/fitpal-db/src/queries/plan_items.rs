//! Queries for the day and item tables below a plan: `workout_days`,
//! `exercises`, `nutrition_days` and `meals`.

use anyhow::{Context, Result};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{Exercise, Meal, MealType, NutritionDay, WorkoutDay};

// ---------------------------------------------------------------------------
// Inserts (run inside the ingestion transaction)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewWorkoutDay<'a> {
    pub plan_id: Uuid,
    pub day_of_week: i32,
    pub title: &'a str,
    pub description: &'a str,
    pub is_rest_day: bool,
}

pub async fn insert_workout_day<'e>(
    executor: impl PgExecutor<'e>,
    new: &NewWorkoutDay<'_>,
) -> Result<WorkoutDay> {
    let day = sqlx::query_as::<_, WorkoutDay>(
        "INSERT INTO workout_days (plan_id, day_of_week, title, description, is_rest_day) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.plan_id)
    .bind(new.day_of_week)
    .bind(new.title)
    .bind(new.description)
    .bind(new.is_rest_day)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert workout day {}", new.day_of_week))?;

    Ok(day)
}

#[derive(Debug, Clone)]
pub struct NewExercise<'a> {
    pub workout_day_id: Uuid,
    pub position: i32,
    pub name: &'a str,
    pub sets: i32,
    pub reps: &'a str,
    pub rest_period_seconds: i32,
    pub duration_mins: i32,
    pub met_value: f64,
    pub notes: Option<&'a str>,
}

pub async fn insert_exercise<'e>(
    executor: impl PgExecutor<'e>,
    new: &NewExercise<'_>,
) -> Result<Exercise> {
    let exercise = sqlx::query_as::<_, Exercise>(
        "INSERT INTO exercises \
             (workout_day_id, position, name, sets, reps, rest_period_seconds, \
              duration_mins, met_value, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING *",
    )
    .bind(new.workout_day_id)
    .bind(new.position)
    .bind(new.name)
    .bind(new.sets)
    .bind(new.reps)
    .bind(new.rest_period_seconds)
    .bind(new.duration_mins)
    .bind(new.met_value)
    .bind(new.notes)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert exercise {:?}", new.name))?;

    Ok(exercise)
}

#[derive(Debug, Clone)]
pub struct NewNutritionDay<'a> {
    pub plan_id: Uuid,
    pub day_of_week: i32,
    pub target_calories: Option<i32>,
    pub target_protein_grams: Option<i32>,
    pub target_carbs_grams: Option<i32>,
    pub target_fats_grams: Option<i32>,
    pub target_water_litres: Option<f64>,
    pub notes: Option<&'a str>,
}

pub async fn insert_nutrition_day<'e>(
    executor: impl PgExecutor<'e>,
    new: &NewNutritionDay<'_>,
) -> Result<NutritionDay> {
    let day = sqlx::query_as::<_, NutritionDay>(
        "INSERT INTO nutrition_days \
             (plan_id, day_of_week, target_calories, target_protein_grams, \
              target_carbs_grams, target_fats_grams, target_water_litres, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING *",
    )
    .bind(new.plan_id)
    .bind(new.day_of_week)
    .bind(new.target_calories)
    .bind(new.target_protein_grams)
    .bind(new.target_carbs_grams)
    .bind(new.target_fats_grams)
    .bind(new.target_water_litres)
    .bind(new.notes)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert nutrition day {}", new.day_of_week))?;

    Ok(day)
}

#[derive(Debug, Clone)]
pub struct NewMeal<'a> {
    pub nutrition_day_id: Uuid,
    pub position: i32,
    pub meal_type: MealType,
    pub description: &'a str,
    pub calories: i32,
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fats_grams: f64,
    pub portion_size: Option<&'a str>,
}

pub async fn insert_meal<'e>(executor: impl PgExecutor<'e>, new: &NewMeal<'_>) -> Result<Meal> {
    let meal = sqlx::query_as::<_, Meal>(
        "INSERT INTO meals \
             (nutrition_day_id, position, meal_type, description, calories, \
              protein_grams, carbs_grams, fats_grams, portion_size) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING *",
    )
    .bind(new.nutrition_day_id)
    .bind(new.position)
    .bind(new.meal_type)
    .bind(new.description)
    .bind(new.calories)
    .bind(new.protein_grams)
    .bind(new.carbs_grams)
    .bind(new.fats_grams)
    .bind(new.portion_size)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert {} meal", new.meal_type))?;

    Ok(meal)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub async fn list_workout_days(pool: &PgPool, plan_id: Uuid) -> Result<Vec<WorkoutDay>> {
    let days = sqlx::query_as::<_, WorkoutDay>(
        "SELECT * FROM workout_days WHERE plan_id = $1 ORDER BY day_of_week",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list workout days")?;

    Ok(days)
}

pub async fn get_workout_day(
    pool: &PgPool,
    plan_id: Uuid,
    day_of_week: i32,
) -> Result<Option<WorkoutDay>> {
    let day = sqlx::query_as::<_, WorkoutDay>(
        "SELECT * FROM workout_days WHERE plan_id = $1 AND day_of_week = $2",
    )
    .bind(plan_id)
    .bind(day_of_week)
    .fetch_optional(pool)
    .await
    .context("failed to fetch workout day")?;

    Ok(day)
}

/// Exercises of every workout day in a plan, ordered by day then position.
pub async fn list_exercises_for_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<Exercise>> {
    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT e.* FROM exercises e \
         JOIN workout_days wd ON wd.id = e.workout_day_id \
         WHERE wd.plan_id = $1 \
         ORDER BY wd.day_of_week, e.position",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list exercises for plan")?;

    Ok(exercises)
}

pub async fn list_exercises_for_day(pool: &PgPool, workout_day_id: Uuid) -> Result<Vec<Exercise>> {
    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT * FROM exercises WHERE workout_day_id = $1 ORDER BY position",
    )
    .bind(workout_day_id)
    .fetch_all(pool)
    .await
    .context("failed to list exercises")?;

    Ok(exercises)
}

pub async fn list_nutrition_days(pool: &PgPool, plan_id: Uuid) -> Result<Vec<NutritionDay>> {
    let days = sqlx::query_as::<_, NutritionDay>(
        "SELECT * FROM nutrition_days WHERE plan_id = $1 ORDER BY day_of_week",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list nutrition days")?;

    Ok(days)
}

pub async fn get_nutrition_day(
    pool: &PgPool,
    plan_id: Uuid,
    day_of_week: i32,
) -> Result<Option<NutritionDay>> {
    let day = sqlx::query_as::<_, NutritionDay>(
        "SELECT * FROM nutrition_days WHERE plan_id = $1 AND day_of_week = $2",
    )
    .bind(plan_id)
    .bind(day_of_week)
    .fetch_optional(pool)
    .await
    .context("failed to fetch nutrition day")?;

    Ok(day)
}

/// Meals of every nutrition day in a plan, ordered by day then position.
pub async fn list_meals_for_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<Meal>> {
    let meals = sqlx::query_as::<_, Meal>(
        "SELECT m.* FROM meals m \
         JOIN nutrition_days nd ON nd.id = m.nutrition_day_id \
         WHERE nd.plan_id = $1 \
         ORDER BY nd.day_of_week, m.position",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list meals for plan")?;

    Ok(meals)
}

pub async fn list_meals_for_day(pool: &PgPool, nutrition_day_id: Uuid) -> Result<Vec<Meal>> {
    let meals = sqlx::query_as::<_, Meal>(
        "SELECT * FROM meals WHERE nutrition_day_id = $1 ORDER BY position",
    )
    .bind(nutrition_day_id)
    .fetch_all(pool)
    .await
    .context("failed to list meals")?;

    Ok(meals)
}

// ---------------------------------------------------------------------------
// Ownership lookups
// ---------------------------------------------------------------------------

/// Fetch an exercise only if it sits in one of `user_id`'s plans.
pub async fn get_exercise_for_user(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Exercise>> {
    let exercise = sqlx::query_as::<_, Exercise>(
        "SELECT e.* FROM exercises e \
         JOIN workout_days wd ON wd.id = e.workout_day_id \
         JOIN fitness_plans fp ON fp.id = wd.plan_id \
         JOIN profiles p ON p.id = fp.profile_id \
         WHERE e.id = $1 AND p.user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch exercise")?;

    Ok(exercise)
}

/// Fetch a meal only if it sits in one of `user_id`'s plans.
pub async fn get_meal_for_user(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Meal>> {
    let meal = sqlx::query_as::<_, Meal>(
        "SELECT m.* FROM meals m \
         JOIN nutrition_days nd ON nd.id = m.nutrition_day_id \
         JOIN fitness_plans fp ON fp.id = nd.plan_id \
         JOIN profiles p ON p.id = fp.profile_id \
         WHERE m.id = $1 AND p.user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch meal")?;

    Ok(meal)
}

/// Fetch a nutrition day only if it belongs to one of `user_id`'s plans.
pub async fn get_nutrition_day_for_user(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<NutritionDay>> {
    let day = sqlx::query_as::<_, NutritionDay>(
        "SELECT nd.* FROM nutrition_days nd \
         JOIN fitness_plans fp ON fp.id = nd.plan_id \
         JOIN profiles p ON p.id = fp.profile_id \
         WHERE nd.id = $1 AND p.user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch nutrition day")?;

    Ok(day)
}

// ---------------------------------------------------------------------------
// External event ids
// ---------------------------------------------------------------------------

pub async fn set_workout_day_event_id(pool: &PgPool, id: Uuid, event_id: Option<&str>) -> Result<()> {
    sqlx::query("UPDATE workout_days SET external_event_id = $2 WHERE id = $1")
        .bind(id)
        .bind(event_id)
        .execute(pool)
        .await
        .context("failed to update workout day event id")?;

    Ok(())
}

pub async fn set_meal_event_id(pool: &PgPool, id: Uuid, event_id: Option<&str>) -> Result<()> {
    sqlx::query("UPDATE meals SET external_event_id = $2 WHERE id = $1")
        .bind(id)
        .bind(event_id)
        .execute(pool)
        .await
        .context("failed to update meal event id")?;

    Ok(())
}
