//! Handlers for `fitpal calendar` subcommands, backed by Google Calendar.

use anyhow::Result;
use sqlx::PgPool;

use fitpal_core::calendar::{CalendarSync, GoogleCalendarClient, SyncOutcome};

use crate::CalendarCommands;
use crate::config::FitpalConfig;
use crate::resolve::{parse_id, resolve_user};

pub async fn run_calendar_command(
    command: CalendarCommands,
    pool: &PgPool,
    config: &FitpalConfig,
) -> Result<()> {
    let user = resolve_user(pool, config.user.as_deref()).await?;
    let google = GoogleCalendarClient::new(crate::http_client()?);
    let sync = CalendarSync::new(pool, &google).with_calendar_name(config.calendar_name.clone());

    match command {
        CalendarCommands::Sync { plan_id, scope } => {
            let id = parse_id(&plan_id, "plan")?;
            let outcome = sync.sync_plan(user.id, id, scope).await?;
            print_outcome("added to", &config.calendar_name, scope.as_str(), outcome);
        }
        CalendarCommands::Unsync { plan_id, scope } => {
            let id = parse_id(&plan_id, "plan")?;
            let outcome = sync.unsync_plan(user.id, id, scope).await?;
            print_outcome("removed from", &config.calendar_name, scope.as_str(), outcome);
        }
        CalendarCommands::Delete => {
            if sync.delete_calendar(user.id).await? {
                println!("Calendar {:?} deleted.", config.calendar_name);
            } else {
                println!("No synced plan with a calendar found; nothing deleted.");
            }
        }
    }
    Ok(())
}

fn print_outcome(verb: &str, calendar: &str, scope: &str, outcome: SyncOutcome) {
    println!(
        "{} {scope} event(s) {verb} calendar {calendar:?}.",
        outcome.success_count
    );
    if outcome.failure_count > 0 {
        println!(
            "{} event(s) failed; run the command again to retry them.",
            outcome.failure_count
        );
    }
}
