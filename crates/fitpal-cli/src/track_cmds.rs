//! Handlers for `fitpal track` subcommands.

use anyhow::Result;
use sqlx::PgPool;

use fitpal_core::tracking::{
    MealLog, WaterLog, WorkoutLog, delete_meal_tracking, delete_water_tracking, delete_workout_tracking,
    list_meal_tracking, list_water_tracking, list_workout_tracking, log_meal, log_water, log_workout,
};

use crate::config::FitpalConfig;
use crate::resolve::{parse_id, resolve_user};
use crate::{TrackCommands, TrackKind};

pub async fn run_track_command(command: TrackCommands, pool: &PgPool, config: &FitpalConfig) -> Result<()> {
    let user = resolve_user(pool, config.user.as_deref()).await?;

    match command {
        TrackCommands::Workout {
            exercise_id,
            date,
            sets,
            calories,
            notes,
        } => {
            let log = WorkoutLog {
                exercise_id: parse_id(&exercise_id, "exercise")?,
                date_completed: date.unwrap_or_else(crate::today),
                sets_completed: sets,
                calories_burned: calories,
                notes,
            };
            let row = log_workout(pool, user.id, &log).await?;
            println!(
                "Workout tracked for {} ({} kcal) [{}]",
                row.date_completed, row.calories_burned, row.id
            );
        }
        TrackCommands::Meal {
            meal_id,
            date,
            portion,
            notes,
        } => {
            let log = MealLog {
                meal_id: parse_id(&meal_id, "meal")?,
                date_completed: date.unwrap_or_else(crate::today),
                portion_consumed: portion,
                notes,
            };
            let row = log_meal(pool, user.id, &log).await?;
            println!("Meal tracked for {} [{}]", row.date_completed, row.id);
        }
        TrackCommands::Water {
            nutrition_day_id,
            litres,
            date,
            notes,
        } => {
            let log = WaterLog {
                nutrition_day_id: parse_id(&nutrition_day_id, "nutrition day")?,
                date: date.unwrap_or_else(crate::today),
                litres_consumed: litres,
                notes,
            };
            let row = log_water(pool, user.id, &log).await?;
            println!("{} L of water tracked for {} [{}]", row.litres_consumed, row.date, row.id);
        }
        TrackCommands::List { kind, date } => {
            let wants = |k: TrackKind| kind.is_none_or(|want| want == k);
            if wants(TrackKind::Workout) {
                println!("Workouts:");
                for row in list_workout_tracking(pool, user.id, date).await? {
                    println!(
                        "  {}  exercise {}  {} sets  {} kcal  [{}]",
                        row.date_completed, row.exercise_id, row.sets_completed, row.calories_burned, row.id
                    );
                }
            }
            if wants(TrackKind::Meal) {
                println!("Meals:");
                for row in list_meal_tracking(pool, user.id, date).await? {
                    println!(
                        "  {}  meal {}  portion {}  [{}]",
                        row.date_completed, row.meal_id, row.portion_consumed, row.id
                    );
                }
            }
            if wants(TrackKind::Water) {
                println!("Water:");
                for row in list_water_tracking(pool, user.id, date).await? {
                    println!(
                        "  {}  day {}  {} L  [{}]",
                        row.date, row.nutrition_day_id, row.litres_consumed, row.id
                    );
                }
            }
        }
        TrackCommands::Delete { kind, id } => {
            let id = parse_id(&id, "tracking")?;
            match kind {
                TrackKind::Workout => delete_workout_tracking(pool, user.id, id).await?,
                TrackKind::Meal => delete_meal_tracking(pool, user.id, id).await?,
                TrackKind::Water => delete_water_tracking(pool, user.id, id).await?,
            }
            println!("Tracking record {id} deleted.");
        }
    }
    Ok(())
}
