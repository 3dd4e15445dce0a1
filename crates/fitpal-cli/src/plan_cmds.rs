//! Handlers for `fitpal plan` subcommands.
//!
//! - `fitpal plan create [--start <date>]` -- generate, validate and store a plan
//! - `fitpal plan list`                    -- the acting user's plans
//! - `fitpal plan show <plan-id>`          -- days, exercises and meals
//! - `fitpal plan delete <plan-id>`

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use fitpal_core::plan::{
    GeminiPlanGenerator, PlanAggregate, PlanDetail, PlanGenerator, TemplatePlanGenerator, create_plan,
    delete_plan, get_plan_aggregate, list_plans,
};
use fitpal_core::profile::load_profile;

use crate::PlanCommands;
use crate::config::{FitpalConfig, GeneratorConfig};
use crate::resolve::{parse_id, resolve_user};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

pub async fn run_plan_command(command: PlanCommands, pool: &PgPool, config: &FitpalConfig) -> Result<()> {
    match command {
        PlanCommands::Create { start } => cmd_create(pool, config, start).await,
        PlanCommands::List => cmd_list(pool, config).await,
        PlanCommands::Show { plan_id, json } => cmd_show(pool, config, &plan_id, json).await,
        PlanCommands::Delete { plan_id } => {
            let user = resolve_user(pool, config.user.as_deref()).await?;
            let id = parse_id(&plan_id, "plan")?;
            delete_plan(pool, user.id, id).await?;
            println!("Plan {id} deleted.");
            Ok(())
        }
    }
}

fn build_generator(config: &FitpalConfig) -> Result<Box<dyn PlanGenerator>> {
    let generator: Box<dyn PlanGenerator> = match config.require_generator()? {
        GeneratorConfig::Gemini { api_key, model } => {
            let mut gemini = GeminiPlanGenerator::new(crate::http_client()?, api_key.clone());
            if let Some(model) = model {
                gemini = gemini.with_model(model.clone());
            }
            Box::new(gemini)
        }
        GeneratorConfig::Template => Box::new(TemplatePlanGenerator),
    };
    Ok(generator)
}

// -----------------------------------------------------------------------
// fitpal plan create
// -----------------------------------------------------------------------

async fn cmd_create(pool: &PgPool, config: &FitpalConfig, start: Option<chrono::NaiveDate>) -> Result<()> {
    let user = resolve_user(pool, config.user.as_deref()).await?;
    let profile = load_profile(pool, user.id).await?;
    let generator = build_generator(config)?;
    let today = crate::today();
    let start = start.unwrap_or(today);

    info!(generator = generator.name(), %start, "generating plan");
    let aggregate = create_plan(pool, generator.as_ref(), profile.id, start, today).await?;

    println!("Plan created successfully.");
    println!();
    println!("  Plan ID:        {}", aggregate.plan.id);
    println!("  Dates:          {} .. {}", aggregate.plan.start_date, aggregate.plan.end_date);
    println!("  Workout days:   {}", aggregate.workout_days.len());
    println!("  Exercises:      {}", aggregate.exercise_count());
    println!("  Nutrition days: {}", aggregate.nutrition_days.len());
    println!("  Meals:          {}", aggregate.meal_count());
    Ok(())
}

// -----------------------------------------------------------------------
// fitpal plan list
// -----------------------------------------------------------------------

async fn cmd_list(pool: &PgPool, config: &FitpalConfig) -> Result<()> {
    let user = resolve_user(pool, config.user.as_deref()).await?;
    let profile = load_profile(pool, user.id).await?;
    let plans = list_plans(pool, profile.id).await?;

    if plans.is_empty() {
        println!("No plans found. Use `fitpal plan create` to generate one.");
        return Ok(());
    }

    let today = crate::today();
    println!("{:<36}  {:<10}  {:<10}  {:<6}  CALENDAR", "ID", "START", "END", "ACTIVE");
    println!("{}", "-".repeat(84));
    for plan in &plans {
        let calendar = match (plan.workout_added_to_calendar, plan.nutrition_added_to_calendar) {
            (true, true) => "workout+nutrition",
            (true, false) => "workout",
            (false, true) => "nutrition",
            (false, false) => "-",
        };
        println!(
            "{:<36}  {:<10}  {:<10}  {:<6}  {}",
            plan.id,
            plan.start_date,
            plan.end_date,
            if plan.is_active(today) { "yes" } else { "no" },
            calendar
        );
    }
    Ok(())
}

// -----------------------------------------------------------------------
// fitpal plan show <plan-id>
// -----------------------------------------------------------------------

async fn cmd_show(pool: &PgPool, config: &FitpalConfig, plan_id: &str, json: bool) -> Result<()> {
    let user = resolve_user(pool, config.user.as_deref()).await?;
    let id = parse_id(plan_id, "plan")?;
    let detail = get_plan_aggregate(pool, user.id, id, crate::today()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }
    print_detail(&detail);
    Ok(())
}

fn print_detail(detail: &PlanDetail) {
    let PlanAggregate {
        plan,
        workout_days,
        nutrition_days,
    } = &detail.aggregate;

    println!("Plan {}", plan.id);
    println!("  Dates:  {} .. {}", plan.start_date, plan.end_date);
    println!("  Goal:   {}", plan.goal_at_creation.map_or("-", |g| g.as_str()));
    println!("  Active: {}", if detail.is_active { "yes" } else { "no" });

    println!();
    println!("Workouts:");
    for entry in workout_days {
        let day = &entry.day;
        let date = plan.date_for_day(day.day_of_week).map(|d| d.to_string()).unwrap_or_default();
        if day.is_rest_day {
            println!("  Day {} {date}  {} (rest)", day.day_of_week, day.title);
            continue;
        }
        println!("  Day {} {date}  {}", day.day_of_week, day.title);
        for ex in &entry.exercises {
            let kcal = detail.calories_to_burn.get(&ex.id).copied().unwrap_or_default();
            println!(
                "    {:<28} {} x {:<12} {:>3} min  ~{kcal} kcal  [{}]",
                ex.name, ex.sets, ex.reps, ex.duration_mins, ex.id
            );
        }
    }

    println!();
    println!("Nutrition:");
    for entry in nutrition_days {
        let day = &entry.day;
        let target = day.target_calories.map(|c| format!("{c} kcal")).unwrap_or_else(|| "-".into());
        let water = day.target_water_litres.map(|w| format!("{w} L")).unwrap_or_else(|| "-".into());
        println!("  Day {}  target {target}, water {water}  [{}]", day.day_of_week, day.id);
        for meal in &entry.meals {
            println!(
                "    {:<10} {:<40} {:>5} kcal  [{}]",
                meal.meal_type.label(),
                meal.description,
                meal.calories,
                meal.id
            );
        }
    }
}
