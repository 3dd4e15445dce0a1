//! Integration tests for plan creation, ingestion and the plan read paths.

mod common;

use chrono::Days;
use serde_json::json;

use common::{ScriptedGenerator, date, plan_json, seed_plan};
use fitpal_core::FitpalError;
use fitpal_core::plan::{
    PlanDocument, TemplatePlanGenerator, create_plan, delete_plan, get_plan_aggregate, ingest_plan,
    list_plans, validate_plan_document,
};
use fitpal_db::models::Goal;
use fitpal_test_utils::{create_test_db, drop_test_db, seed_user_with_profile};

async fn table_count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn create_plan_persists_full_aggregate() {
    let (pool, db_name) = create_test_db().await;
    let (_user, profile) = seed_user_with_profile(&pool, "ama").await;
    let generator = ScriptedGenerator::returning(plan_json().to_string());
    let start = date(2025, 3, 10);

    let aggregate = create_plan(&pool, &generator, profile.id, start, start)
        .await
        .expect("create_plan");

    assert_eq!(aggregate.plan.start_date, start);
    assert_eq!(aggregate.plan.end_date, date(2025, 3, 16));
    assert_eq!(aggregate.plan.goal_at_creation, Some(Goal::WeightLoss));
    assert!(aggregate.plan.ai_prompt_text.contains("- Start Date: 2025-03-10 (weekday 1)"));
    assert_eq!(aggregate.plan.ai_response_raw, Some(plan_json()));
    assert_eq!(aggregate.workout_days.len(), 4);
    assert_eq!(aggregate.nutrition_days.len(), 2);
    assert_eq!(aggregate.exercise_count(), 4);
    assert_eq!(aggregate.meal_count(), 3);
    assert_eq!(aggregate.workout_days[0].exercises[1].name, "Push-ups");
    assert_eq!(aggregate.workout_days[0].exercises[1].position, 1);
    assert_eq!(generator.calls(), 1);

    assert_eq!(table_count(&pool, "exercises").await, 4);
    assert_eq!(table_count(&pool, "meals").await, 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn invalid_document_persists_nothing() {
    let (pool, db_name) = create_test_db().await;
    let (_user, profile) = seed_user_with_profile(&pool, "kwame").await;
    let mut doc = plan_json();
    doc["workout_days"][0]["exercises"][0]["sets"] = json!(-1);
    doc["nutrition_days"][1]["meals"][0].as_object_mut().unwrap().remove("calories");
    let generator = ScriptedGenerator::returning(doc.to_string());
    let start = date(2025, 3, 10);

    let err = create_plan(&pool, &generator, profile.id, start, start)
        .await
        .unwrap_err();
    match &err {
        FitpalError::SchemaValidation(e) => {
            assert!(e.has_issue_at("workout_days[0].exercises[0].sets"));
            assert!(e.has_issue_at("nutrition_days[1].meals[0].calories"));
        }
        other => panic!("expected schema validation error, got {other:?}"),
    }
    assert!(err.is_validation());
    assert_eq!(table_count(&pool, "fitness_plans").await, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn non_json_response_is_a_schema_error() {
    let (pool, db_name) = create_test_db().await;
    let (_user, profile) = seed_user_with_profile(&pool, "esi").await;
    let generator = ScriptedGenerator::returning("Sorry, I cannot help with that.");
    let start = date(2025, 3, 10);

    let err = create_plan(&pool, &generator, profile.id, start, start)
        .await
        .unwrap_err();
    assert!(matches!(err, FitpalError::SchemaValidation(_)), "{err:?}");
    assert_eq!(table_count(&pool, "fitness_plans").await, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn generator_failure_is_external_service() {
    let (pool, db_name) = create_test_db().await;
    let (_user, profile) = seed_user_with_profile(&pool, "yaw").await;
    let generator = ScriptedGenerator::failing("connection refused");
    let start = date(2025, 3, 10);

    let err = create_plan(&pool, &generator, profile.id, start, start)
        .await
        .unwrap_err();
    assert!(matches!(err, FitpalError::ExternalService(ref m) if m.contains("connection refused")));
    assert_eq!(table_count(&pool, "fitness_plans").await, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn overlapping_plan_is_a_conflict() {
    let (pool, db_name) = create_test_db().await;
    let (_user, profile) = seed_user_with_profile(&pool, "abena").await;
    let generator = ScriptedGenerator::returning(plan_json().to_string());
    let start = date(2025, 3, 10);

    create_plan(&pool, &generator, profile.id, start, start)
        .await
        .expect("first plan");

    let overlapping = start.checked_add_days(Days::new(6)).unwrap();
    let err = create_plan(&pool, &generator, profile.id, overlapping, start)
        .await
        .unwrap_err();
    assert!(matches!(err, FitpalError::Conflict(_)), "{err:?}");
    assert_eq!(generator.calls(), 1, "no generation for a conflicting range");

    let adjacent = start.checked_add_days(Days::new(7)).unwrap();
    create_plan(&pool, &generator, profile.id, adjacent, start)
        .await
        .expect("adjacent plan");

    let plans = list_plans(&pool, profile.id).await.unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].start_date, adjacent, "newest first");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn start_dates_far_in_the_past_are_rejected() {
    let (pool, db_name) = create_test_db().await;
    let (_user, profile) = seed_user_with_profile(&pool, "kojo").await;
    let generator = ScriptedGenerator::returning(plan_json().to_string());
    let today = date(2025, 3, 20);

    let err = create_plan(&pool, &generator, profile.id, date(2025, 3, 13), today)
        .await
        .unwrap_err();
    assert!(matches!(err, FitpalError::Validation(ref m) if m.contains("past date")));
    assert_eq!(generator.calls(), 0);

    create_plan(&pool, &generator, profile.id, date(2025, 3, 14), today)
        .await
        .expect("a plan still covering today is allowed");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let (pool, db_name) = create_test_db().await;
    let generator = ScriptedGenerator::returning(plan_json().to_string());

    let err = create_plan(&pool, &generator, uuid::Uuid::new_v4(), date(2025, 3, 10), date(2025, 3, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, FitpalError::NotFound(_)));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn failed_ingestion_rolls_back_everything() {
    let (pool, db_name) = create_test_db().await;
    let (_user, profile) = seed_user_with_profile(&pool, "efua").await;

    // Two entries for Monday slip past a hand-built document but not the
    // unique (plan, day) constraint.
    let raw = plan_json();
    let valid = validate_plan_document(&raw).unwrap();
    let mut workout_days = valid.workout_days.clone();
    workout_days.push(valid.workout_days[0].clone());
    let document = PlanDocument {
        workout_days,
        nutrition_days: valid.nutrition_days.clone(),
    };

    let err = ingest_plan(&pool, &profile, date(2025, 3, 10), "prompt", &raw, &document)
        .await
        .unwrap_err();
    assert!(matches!(err, FitpalError::Persistence(_)), "{err:?}");

    for table in ["fitness_plans", "workout_days", "exercises", "nutrition_days", "meals"] {
        assert_eq!(table_count(&pool, table).await, 0, "{table} should be empty");
    }

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn plan_detail_is_owner_only() {
    let (pool, db_name) = create_test_db().await;
    let (owner, profile) = seed_user_with_profile(&pool, "owner").await;
    let (intruder, _) = seed_user_with_profile(&pool, "intruder").await;
    let start = date(2025, 3, 10);
    let aggregate = seed_plan(&pool, &profile, start).await;
    let plan_id = aggregate.plan.id;

    let detail = get_plan_aggregate(&pool, owner.id, plan_id, date(2025, 3, 12))
        .await
        .expect("owner can read");
    assert!(detail.is_active);
    let squats = &detail.aggregate.workout_days[0].exercises[0];
    assert_eq!(squats.name, "Squats");
    // 5 MET * 3.5 * 70 kg / 200 * 10 min
    assert_eq!(detail.calories_to_burn[&squats.id], 61);

    let err = get_plan_aggregate(&pool, intruder.id, plan_id, start)
        .await
        .unwrap_err();
    assert!(matches!(err, FitpalError::NotFound(_)));

    let err = delete_plan(&pool, intruder.id, plan_id).await.unwrap_err();
    assert!(matches!(err, FitpalError::NotFound(_)));

    delete_plan(&pool, owner.id, plan_id).await.expect("owner deletes");
    assert_eq!(table_count(&pool, "exercises").await, 0, "cascade");
    let err = delete_plan(&pool, owner.id, plan_id).await.unwrap_err();
    assert!(matches!(err, FitpalError::NotFound(_)));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn template_generator_produces_a_storable_plan() {
    let (pool, db_name) = create_test_db().await;
    let (_user, profile) = seed_user_with_profile(&pool, "offline").await;
    let start = date(2025, 3, 10);

    let aggregate = create_plan(&pool, &TemplatePlanGenerator, profile.id, start, start)
        .await
        .expect("template plan");
    assert_eq!(aggregate.workout_days.len(), 7);
    assert_eq!(aggregate.nutrition_days.len(), 7);
    assert!(aggregate.workout_days[1].day.is_rest_day);

    pool.close().await;
    drop_test_db(&db_name).await;
}
