//! Plan service layer.
//!
//! [`create_plan`] runs the whole creation flow: date and overlap checks,
//! prompt, generator call, strict validation and ingestion. Nothing is
//! written unless every step before ingestion succeeded.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use fitpal_db::models::{FitnessPlan, PLAN_LENGTH_DAYS, plan_end_date};
use fitpal_db::queries::{plans as plan_queries, profiles as profile_queries};

use super::generator::PlanGenerator;
use super::ingest::{PlanAggregate, ingest_plan, load_aggregate};
use super::prompt::build_plan_prompt;
use super::schema::{SchemaIssue, SchemaValidationError, validate_plan_document};
use crate::error::{FitpalError, Result};
use crate::profile::{calculate_calories_burned, load_profile};

/// A stored plan as shown to its owner.
#[derive(Debug, Clone, Serialize)]
pub struct PlanDetail {
    #[serde(flatten)]
    pub aggregate: PlanAggregate,
    pub is_active: bool,
    /// Estimated kcal per exercise id, from the owner's current weight.
    pub calories_to_burn: HashMap<Uuid, i64>,
}

/// Generate, validate and store a plan for `profile_id` covering
/// `start_date` and the following six days.
pub async fn create_plan(
    pool: &PgPool,
    generator: &dyn PlanGenerator,
    profile_id: Uuid,
    start_date: NaiveDate,
    today: NaiveDate,
) -> Result<PlanAggregate> {
    let profile = profile_queries::get_profile(pool, profile_id)
        .await?
        .ok_or_else(|| FitpalError::not_found(format!("profile {profile_id}")))?;

    let earliest = today
        .checked_sub_days(Days::new(PLAN_LENGTH_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);
    if start_date < earliest {
        return Err(FitpalError::validation("cannot create plan for a past date"));
    }

    let end_date = plan_end_date(start_date)
        .ok_or_else(|| FitpalError::validation(format!("start date {start_date} is out of range")))?;
    let overlapping = plan_queries::plans_overlapping(pool, profile.id, start_date, end_date).await?;
    if let Some(existing) = overlapping.first() {
        return Err(FitpalError::conflict(format!(
            "plan {} already covers {} to {}",
            existing.id, existing.start_date, existing.end_date
        )));
    }

    let prompt = build_plan_prompt(&profile, start_date);
    info!(%profile_id, %start_date, generator = generator.name(), "requesting plan");

    let text = generator.generate(&prompt).await.map_err(|e| {
        warn!(error = %e, generator = generator.name(), "plan generation failed");
        FitpalError::ExternalService(e.to_string())
    })?;

    let raw = parse_generated(&text)?;
    let document = validate_plan_document(&raw).inspect_err(|e| {
        warn!(issues = e.issues.len(), "generated plan rejected");
    })?;

    ingest_plan(pool, &profile, start_date, &prompt, &raw, &document).await
}

/// Parse generator output as JSON, tolerating a surrounding Markdown code
/// fence.
fn parse_generated(text: &str) -> std::result::Result<Value, SchemaValidationError> {
    let trimmed = strip_code_fence(text.trim());
    serde_json::from_str(trimmed).map_err(|e| SchemaValidationError {
        issues: vec![SchemaIssue::new("", format!("response is not valid JSON: {e}"))],
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Plans of a profile, newest start date first.
pub async fn list_plans(pool: &PgPool, profile_id: Uuid) -> Result<Vec<FitnessPlan>> {
    Ok(plan_queries::list_plans_for_profile(pool, profile_id).await?)
}

/// Fetch a plan of `user_id` with its days, items and calorie estimates.
pub async fn get_plan_aggregate(
    pool: &PgPool,
    user_id: Uuid,
    plan_id: Uuid,
    today: NaiveDate,
) -> Result<PlanDetail> {
    let plan = plan_queries::get_plan_for_user(pool, user_id, plan_id)
        .await?
        .ok_or_else(|| FitpalError::not_found(format!("plan {plan_id}")))?;
    let profile = load_profile(pool, user_id).await?;

    let is_active = plan.is_active(today);
    let aggregate = load_aggregate(pool, plan).await?;
    let calories_to_burn = aggregate
        .workout_days
        .iter()
        .flat_map(|d| &d.exercises)
        .map(|e| {
            let kcal = calculate_calories_burned(
                Some(e.met_value),
                profile.current_weight,
                Some(e.duration_mins),
            );
            (e.id, kcal)
        })
        .collect();

    Ok(PlanDetail {
        aggregate,
        is_active,
        calories_to_burn,
    })
}

pub async fn delete_plan(pool: &PgPool, user_id: Uuid, plan_id: Uuid) -> Result<()> {
    if !plan_queries::delete_plan_for_user(pool, user_id, plan_id).await? {
        return Err(FitpalError::not_found(format!("plan {plan_id}")));
    }
    info!(%plan_id, %user_id, "plan deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fence("{}"), "{}");
    }

    #[test]
    fn invalid_json_becomes_root_schema_issue() {
        let err = parse_generated("not json").unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "");
        assert!(err.issues[0].problem.starts_with("response is not valid JSON"));
    }

    #[test]
    fn fenced_json_parses() {
        let value = parse_generated("```json\n{\"workout_days\": []}\n```").unwrap();
        assert_eq!(value["workout_days"], serde_json::json!([]));
    }
}
