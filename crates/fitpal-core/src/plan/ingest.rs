//! Plan ingestion: persist a validated [`PlanDocument`] as a plan row and its
//! day and item rows, all inside a single transaction.

use std::collections::HashMap;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use fitpal_db::models::{Exercise, FitnessPlan, Meal, NutritionDay, Profile, WorkoutDay, plan_end_date};
use fitpal_db::queries::{plan_items, plans as plan_queries};

use super::schema::PlanDocument;
use crate::error::{FitpalError, Result};

/// A plan with its ordered day and item rows.
#[derive(Debug, Clone, Serialize)]
pub struct PlanAggregate {
    pub plan: FitnessPlan,
    pub workout_days: Vec<WorkoutDayEntry>,
    pub nutrition_days: Vec<NutritionDayEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutDayEntry {
    pub day: WorkoutDay,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NutritionDayEntry {
    pub day: NutritionDay,
    pub meals: Vec<Meal>,
}

impl PlanAggregate {
    pub fn exercise_count(&self) -> usize {
        self.workout_days.iter().map(|d| d.exercises.len()).sum()
    }

    pub fn meal_count(&self) -> usize {
        self.nutrition_days.iter().map(|d| d.meals.len()).sum()
    }
}

/// Store `document` as a new 7-day plan for `profile` starting on
/// `start_date`.
///
/// Does not check for overlapping plans; callers do that first. If any
/// insert fails the transaction is dropped without a commit, so nothing is
/// left behind.
pub async fn ingest_plan(
    pool: &PgPool,
    profile: &Profile,
    start_date: NaiveDate,
    prompt: &str,
    raw_document: &Value,
    document: &PlanDocument,
) -> Result<PlanAggregate> {
    let end_date = plan_end_date(start_date)
        .ok_or_else(|| FitpalError::validation(format!("start date {start_date} is out of range")))?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let plan = plan_queries::insert_plan(
        &mut *tx,
        &plan_queries::NewPlan {
            profile_id: profile.id,
            start_date,
            end_date,
            goal_at_creation: profile.goal,
            ai_prompt_text: prompt,
            ai_response_raw: raw_document,
        },
    )
    .await?;

    let mut workout_days = Vec::with_capacity(document.workout_days.len());
    for day_doc in &document.workout_days {
        let day = plan_items::insert_workout_day(
            &mut *tx,
            &plan_items::NewWorkoutDay {
                plan_id: plan.id,
                day_of_week: day_doc.day_of_week,
                title: &day_doc.title,
                description: &day_doc.description,
                is_rest_day: day_doc.is_rest_day,
            },
        )
        .await?;

        let mut exercises = Vec::with_capacity(day_doc.exercises.len());
        for (position, ex) in (0_i32..).zip(&day_doc.exercises) {
            let exercise = plan_items::insert_exercise(
                &mut *tx,
                &plan_items::NewExercise {
                    workout_day_id: day.id,
                    position,
                    name: &ex.name,
                    sets: ex.sets,
                    reps: &ex.reps,
                    rest_period_seconds: ex.rest_period_seconds,
                    duration_mins: ex.duration_mins,
                    met_value: ex.met_value,
                    notes: ex.notes.as_deref(),
                },
            )
            .await?;
            exercises.push(exercise);
        }
        workout_days.push(WorkoutDayEntry { day, exercises });
    }

    let mut nutrition_days = Vec::with_capacity(document.nutrition_days.len());
    for day_doc in &document.nutrition_days {
        let day = plan_items::insert_nutrition_day(
            &mut *tx,
            &plan_items::NewNutritionDay {
                plan_id: plan.id,
                day_of_week: day_doc.day_of_week,
                target_calories: day_doc.target_calories,
                target_protein_grams: day_doc.target_protein_grams,
                target_carbs_grams: day_doc.target_carbs_grams,
                target_fats_grams: day_doc.target_fats_grams,
                target_water_litres: day_doc.target_water_litres,
                notes: day_doc.notes.as_deref(),
            },
        )
        .await?;

        let mut meals = Vec::with_capacity(day_doc.meals.len());
        for (position, meal_doc) in (0_i32..).zip(&day_doc.meals) {
            let meal = plan_items::insert_meal(
                &mut *tx,
                &plan_items::NewMeal {
                    nutrition_day_id: day.id,
                    position,
                    meal_type: meal_doc.meal_type,
                    description: &meal_doc.description,
                    calories: meal_doc.calories,
                    protein_grams: meal_doc.protein_grams,
                    carbs_grams: meal_doc.carbs_grams,
                    fats_grams: meal_doc.fats_grams,
                    portion_size: meal_doc.portion_size.as_deref(),
                },
            )
            .await?;
            meals.push(meal);
        }
        nutrition_days.push(NutritionDayEntry { day, meals });
    }

    tx.commit().await.context("failed to commit plan")?;

    info!(
        plan_id = %plan.id,
        profile_id = %profile.id,
        %start_date,
        workout_days = workout_days.len(),
        nutrition_days = nutrition_days.len(),
        "plan ingested"
    );

    workout_days.sort_by_key(|d| d.day.day_of_week);
    nutrition_days.sort_by_key(|d| d.day.day_of_week);

    Ok(PlanAggregate {
        plan,
        workout_days,
        nutrition_days,
    })
}

/// Read a stored plan back with its days ordered by day of week and items
/// by position.
pub async fn load_aggregate(pool: &PgPool, plan: FitnessPlan) -> Result<PlanAggregate> {
    let days = plan_items::list_workout_days(pool, plan.id).await?;
    let mut exercises_by_day: HashMap<Uuid, Vec<Exercise>> = HashMap::new();
    for exercise in plan_items::list_exercises_for_plan(pool, plan.id).await? {
        exercises_by_day
            .entry(exercise.workout_day_id)
            .or_default()
            .push(exercise);
    }
    let workout_days = days
        .into_iter()
        .map(|day| WorkoutDayEntry {
            exercises: exercises_by_day.remove(&day.id).unwrap_or_default(),
            day,
        })
        .collect();

    let days = plan_items::list_nutrition_days(pool, plan.id).await?;
    let mut meals_by_day: HashMap<Uuid, Vec<Meal>> = HashMap::new();
    for meal in plan_items::list_meals_for_plan(pool, plan.id).await? {
        meals_by_day.entry(meal.nutrition_day_id).or_default().push(meal);
    }
    let nutrition_days = days
        .into_iter()
        .map(|day| NutritionDayEntry {
            meals: meals_by_day.remove(&day.id).unwrap_or_default(),
            day,
        })
        .collect();

    debug!(plan_id = %plan.id, "plan aggregate loaded");

    Ok(PlanAggregate {
        plan,
        workout_days,
        nutrition_days,
    })
}
