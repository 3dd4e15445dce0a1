//! Integration tests for the profile, plan and tracking query modules.

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use fitpal_db::models::{Goal, MealType, plan_end_date};
use fitpal_db::queries::plan_items::{self, NewExercise, NewMeal, NewNutritionDay, NewWorkoutDay};
use fitpal_db::queries::plans::{self, NewPlan};
use fitpal_db::queries::profiles::{self, ProfileFields};
use fitpal_db::queries::tracking::{self, NewMealTracking, NewWaterTracking, NewWorkoutTracking};
use fitpal_db::queries::users;
use fitpal_test_utils::{create_test_db, drop_test_db, seed_user, seed_user_with_profile};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn insert_plan(pool: &sqlx::PgPool, profile_id: Uuid, start: NaiveDate) -> fitpal_db::models::FitnessPlan {
    let raw = json!({});
    plans::insert_plan(
        pool,
        &NewPlan {
            profile_id,
            start_date: start,
            end_date: plan_end_date(start).unwrap(),
            goal_at_creation: Some(Goal::WeightLoss),
            ai_prompt_text: "prompt",
            ai_response_raw: &raw,
        },
    )
    .await
    .expect("insert_plan")
}

// -----------------------------------------------------------------------
// Profiles
// -----------------------------------------------------------------------

#[tokio::test]
async fn insert_profile_applies_column_defaults() {
    let (pool, db_name) = create_test_db().await;
    let user = seed_user(&pool, "kofi").await;

    let profile = profiles::insert_profile(&pool, user.id, &ProfileFields::default(), true)
        .await
        .expect("insert_profile");

    assert_eq!(profile.time_zone, "UTC");
    assert_eq!(profile.minutes_before_email_reminder, 30);
    assert_eq!(profile.workout_time.to_string(), "06:00:00");
    assert!(profile.tracking_enabled);
    assert!(profile.connected_to_google_account);
    assert_eq!(profile.dietary_preferences, "");

    let second = profiles::insert_profile(&pool, user.id, &ProfileFields::default(), false).await;
    assert!(second.is_err(), "one profile per user");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_profile_only_touches_given_fields() {
    let (pool, db_name) = create_test_db().await;
    let (user, before) = seed_user_with_profile(&pool, "esi").await;

    let changes = ProfileFields {
        current_weight: Some(68.5),
        allergies: Some("peanuts, shellfish".to_string()),
        ..Default::default()
    };
    let after = profiles::update_profile(&pool, user.id, &changes)
        .await
        .expect("update_profile")
        .expect("profile exists");

    assert_eq!(after.current_weight, Some(68.5));
    assert_eq!(after.allergies_list(), vec!["peanuts", "shellfish"]);
    assert_eq!(after.height_cm, before.height_cm);
    assert_eq!(after.goal, before.goal);

    let missing = profiles::update_profile(&pool, Uuid::new_v4(), &changes)
        .await
        .expect("update_profile");
    assert!(missing.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn linked_account_upsert_keeps_refresh_token() {
    let (pool, db_name) = create_test_db().await;
    let user = seed_user(&pool, "yaw").await;

    users::upsert_linked_account(&pool, user.id, "google", "a1", Some("r1"))
        .await
        .unwrap();
    let refreshed = users::upsert_linked_account(&pool, user.id, "google", "a2", None)
        .await
        .unwrap();

    assert_eq!(refreshed.access_token, "a2");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("r1"));
    assert!(users::delete_linked_account(&pool, user.id, "google").await.unwrap());
    assert!(users::get_linked_account(&pool, user.id, "google").await.unwrap().is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Plans
// -----------------------------------------------------------------------

#[tokio::test]
async fn overlapping_plans_use_true_range_intersection() {
    let (pool, db_name) = create_test_db().await;
    let (_, profile) = seed_user_with_profile(&pool, "abena").await;
    insert_plan(&pool, profile.id, date(2025, 3, 10)).await;

    let hit = plans::plans_overlapping(&pool, profile.id, date(2025, 3, 16), date(2025, 3, 22))
        .await
        .unwrap();
    assert_eq!(hit.len(), 1, "shared last day overlaps");

    let within = plans::plans_overlapping(&pool, profile.id, date(2025, 3, 12), date(2025, 3, 12))
        .await
        .unwrap();
    assert_eq!(within.len(), 1);

    let miss = plans::plans_overlapping(&pool, profile.id, date(2025, 3, 17), date(2025, 3, 23))
        .await
        .unwrap();
    assert!(miss.is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn plan_ownership_checks() {
    let (pool, db_name) = create_test_db().await;
    let (owner, profile) = seed_user_with_profile(&pool, "owner").await;
    let (other, _) = seed_user_with_profile(&pool, "other").await;
    let plan = insert_plan(&pool, profile.id, date(2025, 3, 10)).await;

    assert!(plans::get_plan_for_user(&pool, other.id, plan.id).await.unwrap().is_none());
    assert!(!plans::delete_plan_for_user(&pool, other.id, plan.id).await.unwrap());
    assert!(plans::get_plan_for_user(&pool, owner.id, plan.id).await.unwrap().is_some());
    assert!(plans::delete_plan_for_user(&pool, owner.id, plan.id).await.unwrap());
    assert!(plans::get_plan(&pool, plan.id).await.unwrap().is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn clear_calendar_state_resets_every_plan_of_the_user() {
    let (pool, db_name) = create_test_db().await;
    let (user, profile) = seed_user_with_profile(&pool, "kwame").await;
    let first = insert_plan(&pool, profile.id, date(2025, 3, 3)).await;
    let second = insert_plan(&pool, profile.id, date(2025, 3, 10)).await;

    let day = plan_items::insert_workout_day(
        &pool,
        &NewWorkoutDay {
            plan_id: second.id,
            day_of_week: 1,
            title: "Legs",
            description: "",
            is_rest_day: false,
        },
    )
    .await
    .unwrap();
    plan_items::set_workout_day_event_id(&pool, day.id, Some("evt-1")).await.unwrap();
    plans::set_external_calendar_id(&pool, first.id, "cal-1").await.unwrap();
    plans::set_workout_added(&pool, first.id, true).await.unwrap();
    plans::set_nutrition_added(&pool, second.id, true).await.unwrap();

    let synced = plans::first_synced_plan_for_user(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(synced.id, first.id);

    plans::clear_calendar_state_for_user(&pool, user.id).await.unwrap();

    for plan in plans::list_plans_for_profile(&pool, profile.id).await.unwrap() {
        assert!(!plan.workout_added_to_calendar);
        assert!(!plan.nutrition_added_to_calendar);
        assert!(plan.external_calendar_id.is_none());
    }
    let days = plan_items::list_workout_days(&pool, second.id).await.unwrap();
    assert!(days[0].external_event_id.is_none());
    assert!(plans::first_synced_plan_for_user(&pool, user.id).await.unwrap().is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Tracking
// -----------------------------------------------------------------------

#[tokio::test]
async fn duplicate_tracking_returns_none_and_water_is_summed() {
    let (pool, db_name) = create_test_db().await;
    let (user, profile) = seed_user_with_profile(&pool, "efua").await;
    let plan = insert_plan(&pool, profile.id, date(2025, 3, 10)).await;

    let wd = plan_items::insert_workout_day(
        &pool,
        &NewWorkoutDay {
            plan_id: plan.id,
            day_of_week: 1,
            title: "Full body",
            description: "",
            is_rest_day: false,
        },
    )
    .await
    .unwrap();
    let exercise = plan_items::insert_exercise(
        &pool,
        &NewExercise {
            workout_day_id: wd.id,
            position: 0,
            name: "Squats",
            sets: 3,
            reps: "12",
            rest_period_seconds: 60,
            duration_mins: 10,
            met_value: 5.0,
            notes: None,
        },
    )
    .await
    .unwrap();
    let nd = plan_items::insert_nutrition_day(
        &pool,
        &NewNutritionDay {
            plan_id: plan.id,
            day_of_week: 1,
            target_calories: Some(1800),
            target_protein_grams: None,
            target_carbs_grams: None,
            target_fats_grams: None,
            target_water_litres: Some(3.0),
            notes: None,
        },
    )
    .await
    .unwrap();
    let meal = plan_items::insert_meal(
        &pool,
        &NewMeal {
            nutrition_day_id: nd.id,
            position: 0,
            meal_type: MealType::Breakfast,
            description: "Hausa koko with koose",
            calories: 450,
            protein_grams: 12.0,
            carbs_grams: 70.0,
            fats_grams: 10.0,
            portion_size: Some("1 bowl"),
        },
    )
    .await
    .unwrap();

    let workout = NewWorkoutTracking {
        exercise_id: exercise.id,
        user_id: user.id,
        date_completed: date(2025, 3, 10),
        sets_completed: 3,
        calories_burned: 61,
        notes: None,
    };
    assert!(tracking::insert_workout_tracking(&pool, &workout).await.unwrap().is_some());
    assert!(tracking::insert_workout_tracking(&pool, &workout).await.unwrap().is_none());

    let meal_track = NewMealTracking {
        meal_id: meal.id,
        user_id: user.id,
        date_completed: date(2025, 3, 10),
        portion_consumed: 1.0,
        notes: None,
    };
    assert!(tracking::insert_meal_tracking(&pool, &meal_track).await.unwrap().is_some());
    assert!(tracking::insert_meal_tracking(&pool, &meal_track).await.unwrap().is_none());

    for litres in [1.5, 2.0] {
        tracking::insert_water_tracking(
            &pool,
            &NewWaterTracking {
                nutrition_day_id: nd.id,
                user_id: user.id,
                date: date(2025, 3, 10),
                litres_consumed: litres,
                notes: None,
            },
        )
        .await
        .unwrap();
    }

    assert_eq!(tracking::count_workout_tracking_for_day(&pool, user.id, wd.id).await.unwrap(), 1);
    assert_eq!(tracking::count_meal_tracking_for_day(&pool, user.id, nd.id).await.unwrap(), 1);
    let litres = tracking::sum_water_for_day(&pool, user.id, nd.id).await.unwrap();
    assert!((litres - 3.5).abs() < 1e-9);

    let on_day = tracking::list_water_tracking(&pool, user.id, Some(date(2025, 3, 10))).await.unwrap();
    assert_eq!(on_day.len(), 2);
    let other_day = tracking::list_water_tracking(&pool, user.id, Some(date(2025, 3, 11))).await.unwrap();
    assert!(other_day.is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}
