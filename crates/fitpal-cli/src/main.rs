mod calendar_cmd;
mod config;
mod plan_cmds;
mod profile_cmds;
mod progress_cmd;
mod resolve;
mod track_cmds;
mod user_cmds;

use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use fitpal_core::calendar::SyncScope;
use fitpal_db::models::{ActivityLevel, Gender, Goal};
use fitpal_db::pool;

use config::{FitpalConfig, GeneratorProvider};

const HTTP_TIMEOUT: Duration = Duration::from_secs(120);
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "fitpal", about = "Fitness and nutrition planning: generate plans, sync calendars, track progress")]
struct Cli {
    /// Database URL (overrides FITPAL_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Acting user, by username or UUID (overrides FITPAL_USER env var)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a fitpal config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/fitpal")]
        db_url: String,
        /// Plan generator backend
        #[arg(long, value_enum, default_value_t = GeneratorProvider::Gemini)]
        generator: GeneratorProvider,
        /// Gemini API key to store in the config file
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the fitpal database if needed and apply migrations
    DbInit,
    /// User management
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Profile of the acting user
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Linked Google account of the acting user
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Fitness plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Push plans to, and remove them from, the external calendar
    Calendar {
        #[command(subcommand)]
        command: CalendarCommands,
    },
    /// Log completed exercises, meals and water
    Track {
        #[command(subcommand)]
        command: TrackCommands,
    },
    /// Show daily progress (defaults to the current month)
    Progress {
        /// A single day
        #[arg(long, conflicts_with_all = ["start", "end"])]
        date: Option<NaiveDate>,
        /// First day of a range (requires --end)
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        /// Last day of a range (requires --start)
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user
    Create {
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Show a user (defaults to the acting user)
    Show {
        #[arg(value_name = "USER")]
        target: Option<String>,
    },
    /// Delete a user and everything they own
    Delete {
        #[arg(value_name = "USER")]
        target: String,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create the acting user's profile
    Create(ProfileArgs),
    /// Show the profile with BMI and preference lists
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Change selected profile fields
    Set(ProfileArgs),
}

/// Profile fields; every flag is optional and unset flags are left alone.
#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
    #[arg(long)]
    pub age: Option<i32>,
    #[arg(long)]
    pub gender: Option<Gender>,
    /// Current weight in kg
    #[arg(long)]
    pub weight: Option<f64>,
    /// Height in cm
    #[arg(long)]
    pub height: Option<i32>,
    #[arg(long)]
    pub activity_level: Option<ActivityLevel>,
    #[arg(long)]
    pub goal: Option<Goal>,
    /// Comma-separated
    #[arg(long)]
    pub dietary_preferences: Option<String>,
    /// Comma-separated
    #[arg(long)]
    pub allergies: Option<String>,
    /// Comma-separated
    #[arg(long)]
    pub liked_foods: Option<String>,
    /// Comma-separated
    #[arg(long)]
    pub disliked_foods: Option<String>,
    #[arg(long)]
    pub disabilities: Option<String>,
    #[arg(long)]
    pub medical_conditions: Option<String>,
    #[arg(long)]
    pub notifications: Option<bool>,
    #[arg(long)]
    pub email_reminders: Option<bool>,
    /// Email reminder lead time in minutes
    #[arg(long)]
    pub email_reminder_minutes: Option<i32>,
    #[arg(long)]
    pub tracking: Option<bool>,
    #[arg(long)]
    pub track_after_rest_timer: Option<bool>,
    #[arg(long)]
    pub rest_timer_after_exercise: Option<bool>,
    /// IANA time zone, e.g. Africa/Accra
    #[arg(long)]
    pub time_zone: Option<String>,
    #[arg(long, value_parser = resolve::parse_time)]
    pub breakfast_time: Option<NaiveTime>,
    #[arg(long, value_parser = resolve::parse_time)]
    pub lunch_time: Option<NaiveTime>,
    #[arg(long, value_parser = resolve::parse_time)]
    pub dinner_time: Option<NaiveTime>,
    #[arg(long, value_parser = resolve::parse_time)]
    pub snack_time: Option<NaiveTime>,
    #[arg(long, value_parser = resolve::parse_time)]
    pub workout_time: Option<NaiveTime>,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Store Google OAuth tokens for the acting user
    Link {
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: Option<String>,
    },
    /// Forget the stored Google tokens
    Unlink,
    /// Bring the profile's connection flag in line with the stored tokens
    Reconcile,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Generate and store a 7-day plan
    Create {
        /// First day of the plan (defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// List the acting user's plans, newest first
    List,
    /// Show a plan with its days, exercises and meals
    Show {
        plan_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a plan
    Delete { plan_id: String },
}

#[derive(Subcommand)]
pub enum CalendarCommands {
    /// Create calendar events for a plan
    Sync {
        plan_id: String,
        /// workout, nutrition or all
        #[arg(long, default_value = "all")]
        scope: SyncScope,
    },
    /// Delete the calendar events of a plan
    Unsync {
        plan_id: String,
        /// workout, nutrition or all
        #[arg(long, default_value = "all")]
        scope: SyncScope,
    },
    /// Delete the fitpal calendar and forget all event references
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TrackKind {
    Workout,
    Meal,
    Water,
}

#[derive(Subcommand)]
pub enum TrackCommands {
    /// Mark an exercise as done
    Workout {
        exercise_id: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 0)]
        sets: i32,
        /// Estimated from the exercise when omitted
        #[arg(long)]
        calories: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a meal as eaten
    Meal {
        meal_id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Fraction of the planned portion
        #[arg(long, default_value_t = 1.0)]
        portion: f64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Add water drunk against a nutrition day
    Water {
        nutrition_day_id: String,
        #[arg(long)]
        litres: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List tracking records, newest first
    List {
        #[arg(long, value_enum)]
        kind: Option<TrackKind>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a tracking record
    Delete {
        #[arg(value_enum)]
        kind: TrackKind,
        id: String,
    },
}

/// Shared HTTP client for the generator and calendar backends.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Execute the `fitpal init` command: write config file.
fn cmd_init(
    db_url: &str,
    generator: GeneratorProvider,
    api_key: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let has_key = api_key.is_some();
    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        generator: config::GeneratorSection {
            provider: generator,
            api_key,
            model: None,
        },
        calendar: config::CalendarSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  generator.provider = {}", generator.as_str());
    if generator == GeneratorProvider::Gemini && !has_key {
        println!(
            "  generator.api_key not set; export {} or edit the file",
            config::GEMINI_API_KEY_ENV
        );
    }
    println!();
    println!("Next: run `fitpal db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `fitpal db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = FitpalConfig::resolve(cli_db_url, None)?;

    println!("Initializing fitpal database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("fitpal db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db_url = cli.database_url.as_deref();
    let user = cli.user.as_deref();

    match cli.command {
        Commands::Init {
            db_url,
            generator,
            api_key,
            force,
        } => {
            cmd_init(&db_url, generator, api_key, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(db_url).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "fitpal", &mut std::io::stdout());
        }
        Commands::User { command } => {
            let resolved = FitpalConfig::resolve(db_url, user)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = user_cmds::run_user_command(command, &db_pool, &resolved).await;
            db_pool.close().await;
            result?;
        }
        Commands::Account { command } => {
            let resolved = FitpalConfig::resolve(db_url, user)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = user_cmds::run_account_command(command, &db_pool, &resolved).await;
            db_pool.close().await;
            result?;
        }
        Commands::Profile { command } => {
            let resolved = FitpalConfig::resolve(db_url, user)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = profile_cmds::run_profile_command(command, &db_pool, &resolved).await;
            db_pool.close().await;
            result?;
        }
        Commands::Plan { command } => {
            let resolved = FitpalConfig::resolve(db_url, user)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::run_plan_command(command, &db_pool, &resolved).await;
            db_pool.close().await;
            result?;
        }
        Commands::Calendar { command } => {
            let resolved = FitpalConfig::resolve(db_url, user)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = calendar_cmd::run_calendar_command(command, &db_pool, &resolved).await;
            db_pool.close().await;
            result?;
        }
        Commands::Track { command } => {
            let resolved = FitpalConfig::resolve(db_url, user)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = track_cmds::run_track_command(command, &db_pool, &resolved).await;
            db_pool.close().await;
            result?;
        }
        Commands::Progress {
            date,
            start,
            end,
            json,
        } => {
            let resolved = FitpalConfig::resolve(db_url, user)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let selection = progress_cmd::selection(date, start, end);
            let result = progress_cmd::run_progress(&db_pool, &resolved, &selection, json).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
