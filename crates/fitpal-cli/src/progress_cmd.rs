//! Handler for `fitpal progress`.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;

use fitpal_core::profile::load_profile;
use fitpal_core::progress::{DateSelection, DayProgress, compute_progress};

use crate::config::FitpalConfig;
use crate::resolve::resolve_user;

/// Map the `--date` / `--start` / `--end` flags to a selection. Clap
/// enforces that a range has both ends and excludes `--date`.
pub fn selection(date: Option<NaiveDate>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateSelection {
    match (date, start, end) {
        (Some(date), _, _) => DateSelection::Single(date),
        (None, Some(start), Some(end)) => DateSelection::Range { start, end },
        _ => DateSelection::CurrentMonth,
    }
}

pub async fn run_progress(
    pool: &PgPool,
    config: &FitpalConfig,
    selection: &DateSelection,
    json: bool,
) -> Result<()> {
    let user = resolve_user(pool, config.user.as_deref()).await?;
    let profile = load_profile(pool, user.id).await?;
    let records = compute_progress(pool, user.id, profile.id, selection, crate::today()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No plan covers the selected dates.");
        return Ok(());
    }

    println!(
        "{:<10}  {:<3}  {:>9}  {:>9}  {:>7}  PLAN",
        "DATE", "DAY", "WORKOUT%", "NUTRITION%", "WATER%"
    );
    println!("{}", "-".repeat(84));
    for record in &records {
        print_row(record);
    }
    Ok(())
}

fn print_row(r: &DayProgress) {
    let workout = if r.is_rest_day {
        "rest".to_string()
    } else {
        format!("{:.1}", r.workout_progress)
    };
    println!(
        "{:<10}  {:<3}  {:>9}  {:>10.1}  {:>7.1}  {}",
        r.date,
        r.date.format("%a"),
        workout,
        r.nutrition_progress,
        r.water_progress,
        r.plan_id
    );
}
