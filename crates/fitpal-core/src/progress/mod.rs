//! Progress aggregation: per-day completion percentages for workouts,
//! meals and water across the plans covering a date selection.
//!
//! Tracking rows count toward a plan day whatever date they were logged
//! for, and water percentages are not capped at 100.

mod selection;

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use fitpal_db::models::{FitnessPlan, NutritionDay, WorkoutDay};
use fitpal_db::queries::{plan_items, plans as plan_queries, profiles as profile_queries, tracking};

pub use selection::{DateSelection, MAX_RANGE_DAYS, dates_between};

use crate::error::{FitpalError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayProgress {
    pub date: NaiveDate,
    /// ISO weekday of `date`, 1 for Monday.
    pub day_of_week: i32,
    pub plan_id: Uuid,
    pub workout_progress: f64,
    pub nutrition_progress: f64,
    pub water_progress: f64,
    /// Exercises scheduled for the day.
    pub total_workout: usize,
    /// Meals scheduled for the day.
    pub total_nutrition: usize,
    /// Water target in litres.
    pub total_water: f64,
    pub is_rest_day: bool,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `done / total` as a percentage, 0 when nothing is scheduled.
pub fn ratio_percent(done: i64, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(done as f64 / total as f64 * 100.0)
}

/// Litres consumed against the target as a percentage, 0 without a
/// positive target.
pub fn water_percent(consumed: f64, target: Option<f64>) -> f64 {
    match target {
        Some(t) if t > 0.0 => round1(consumed / t * 100.0),
        _ => 0.0,
    }
}

/// Day rows and tracking counts of one plan, keyed by day of week.
struct PlanDays {
    plan: FitnessPlan,
    workouts: HashMap<i32, WorkoutStats>,
    nutrition: HashMap<i32, NutritionStats>,
}

struct WorkoutStats {
    day: WorkoutDay,
    exercises: usize,
    tracked: i64,
}

struct NutritionStats {
    day: NutritionDay,
    meals: usize,
    tracked: i64,
    water: f64,
}

impl PlanDays {
    async fn load(pool: &PgPool, user_id: Uuid, plan: FitnessPlan) -> Result<Self> {
        let mut exercise_counts: HashMap<Uuid, usize> = HashMap::new();
        for ex in plan_items::list_exercises_for_plan(pool, plan.id).await? {
            *exercise_counts.entry(ex.workout_day_id).or_default() += 1;
        }
        let mut workouts = HashMap::new();
        for day in plan_items::list_workout_days(pool, plan.id).await? {
            let tracked = tracking::count_workout_tracking_for_day(pool, user_id, day.id).await?;
            let exercises = exercise_counts.get(&day.id).copied().unwrap_or_default();
            workouts.insert(
                day.day_of_week,
                WorkoutStats {
                    day,
                    exercises,
                    tracked,
                },
            );
        }

        let mut meal_counts: HashMap<Uuid, usize> = HashMap::new();
        for meal in plan_items::list_meals_for_plan(pool, plan.id).await? {
            *meal_counts.entry(meal.nutrition_day_id).or_default() += 1;
        }
        let mut nutrition = HashMap::new();
        for day in plan_items::list_nutrition_days(pool, plan.id).await? {
            let tracked = tracking::count_meal_tracking_for_day(pool, user_id, day.id).await?;
            let water = tracking::sum_water_for_day(pool, user_id, day.id).await?;
            let meals = meal_counts.get(&day.id).copied().unwrap_or_default();
            nutrition.insert(
                day.day_of_week,
                NutritionStats {
                    day,
                    meals,
                    tracked,
                    water,
                },
            );
        }

        Ok(Self {
            plan,
            workouts,
            nutrition,
        })
    }

    fn progress_on(&self, date: NaiveDate) -> DayProgress {
        let day_of_week = i32::try_from(date.weekday().number_from_monday()).unwrap_or_default();

        let workout = self.workouts.get(&day_of_week);
        let is_rest_day = workout.is_some_and(|w| w.day.is_rest_day);
        let workout_progress = match workout {
            Some(w) if w.day.is_rest_day => 100.0,
            Some(w) => ratio_percent(w.tracked, w.exercises),
            None => 0.0,
        };

        let nutrition = self.nutrition.get(&day_of_week);
        let target = nutrition.and_then(|n| n.day.target_water_litres);

        DayProgress {
            date,
            day_of_week,
            plan_id: self.plan.id,
            workout_progress,
            nutrition_progress: nutrition.map_or(0.0, |n| ratio_percent(n.tracked, n.meals)),
            water_progress: nutrition.map_or(0.0, |n| water_percent(n.water, target)),
            total_workout: workout.map_or(0, |w| w.exercises),
            total_nutrition: nutrition.map_or(0, |n| n.meals),
            total_water: round1(target.unwrap_or_default()),
            is_rest_day,
        }
    }
}

/// One record per (date, covering plan) in ascending date order; plans
/// sharing a date follow their start dates. Dates without a plan are
/// left out.
pub async fn compute_progress(
    pool: &PgPool,
    user_id: Uuid,
    profile_id: Uuid,
    selection: &DateSelection,
    today: NaiveDate,
) -> Result<Vec<DayProgress>> {
    let (start, end) = selection.resolve(today)?;

    let profile = profile_queries::get_profile(pool, profile_id)
        .await?
        .filter(|p| p.user_id == user_id)
        .ok_or_else(|| FitpalError::not_found(format!("profile {profile_id}")))?;

    let mut plans = Vec::new();
    for plan in plan_queries::plans_overlapping(pool, profile.id, start, end).await? {
        plans.push(PlanDays::load(pool, user_id, plan).await?);
    }

    let records: Vec<DayProgress> = dates_between(start, end)
        .flat_map(|date| {
            plans
                .iter()
                .filter(move |p| p.plan.is_active(date))
                .map(move |p| p.progress_on(date))
        })
        .collect();

    debug!(%start, %end, plans = plans.len(), records = records.len(), "progress computed");
    Ok(records)
}
