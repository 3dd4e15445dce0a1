//! Queries for the `profiles` table.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::models::{ActivityLevel, Gender, Goal, Profile};

/// Editable profile fields. `None` means "leave as is" on update and "use
/// the column default" on insert.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub current_weight: Option<f64>,
    pub height_cm: Option<i32>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
    pub dietary_preferences: Option<String>,
    pub allergies: Option<String>,
    pub liked_foods: Option<String>,
    pub disliked_foods: Option<String>,
    pub disabilities: Option<String>,
    pub medical_conditions: Option<String>,
    pub notification_reminders_enabled: Option<bool>,
    pub email_reminders_enabled: Option<bool>,
    pub minutes_before_email_reminder: Option<i32>,
    pub tracking_enabled: Option<bool>,
    pub track_after_rest_timer: Option<bool>,
    pub start_rest_timer_after_exercise: Option<bool>,
    pub time_zone: Option<String>,
    pub breakfast_time: Option<NaiveTime>,
    pub lunch_time: Option<NaiveTime>,
    pub dinner_time: Option<NaiveTime>,
    pub snack_time: Option<NaiveTime>,
    pub workout_time: Option<NaiveTime>,
}

/// Bind `fields` as `$2..=$25`, in the column order both statements below use.
fn bind_fields<'q>(
    query: QueryAs<'q, Postgres, Profile, PgArguments>,
    fields: &'q ProfileFields,
) -> QueryAs<'q, Postgres, Profile, PgArguments> {
    query
        .bind(fields.age)
        .bind(fields.gender)
        .bind(fields.current_weight)
        .bind(fields.height_cm)
        .bind(fields.activity_level)
        .bind(fields.goal)
        .bind(fields.dietary_preferences.as_deref())
        .bind(fields.allergies.as_deref())
        .bind(fields.liked_foods.as_deref())
        .bind(fields.disliked_foods.as_deref())
        .bind(fields.disabilities.as_deref())
        .bind(fields.medical_conditions.as_deref())
        .bind(fields.notification_reminders_enabled)
        .bind(fields.email_reminders_enabled)
        .bind(fields.minutes_before_email_reminder)
        .bind(fields.tracking_enabled)
        .bind(fields.track_after_rest_timer)
        .bind(fields.start_rest_timer_after_exercise)
        .bind(fields.time_zone.as_deref())
        .bind(fields.breakfast_time)
        .bind(fields.lunch_time)
        .bind(fields.dinner_time)
        .bind(fields.snack_time)
        .bind(fields.workout_time)
}

/// Insert the profile for `user_id`. Fails on the unique `user_id`
/// constraint when one already exists.
pub async fn insert_profile(
    pool: &PgPool,
    user_id: Uuid,
    fields: &ProfileFields,
    connected_to_google_account: bool,
) -> Result<Profile> {
    let query = sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles ( \
             user_id, age, gender, current_weight, height_cm, activity_level, goal, \
             dietary_preferences, allergies, liked_foods, disliked_foods, disabilities, \
             medical_conditions, notification_reminders_enabled, email_reminders_enabled, \
             minutes_before_email_reminder, tracking_enabled, track_after_rest_timer, \
             start_rest_timer_after_exercise, time_zone, breakfast_time, lunch_time, \
             dinner_time, snack_time, workout_time, connected_to_google_account) \
         VALUES ( \
             $1, $2, $3, $4, $5, $6, $7, \
             COALESCE($8, ''), COALESCE($9, ''), COALESCE($10, ''), COALESCE($11, ''), \
             COALESCE($12, ''), COALESCE($13, ''), COALESCE($14, true), COALESCE($15, true), \
             COALESCE($16, 30), COALESCE($17, true), COALESCE($18, false), \
             COALESCE($19, false), COALESCE($20, 'UTC'), $21, $22, \
             $23, $24, COALESCE($25, TIME '06:00'), $26) \
         RETURNING *",
    )
    .bind(user_id);

    let profile = bind_fields(query, fields)
        .bind(connected_to_google_account)
        .fetch_one(pool)
        .await
        .context("failed to insert profile")?;

    Ok(profile)
}

/// Apply the `Some` fields of `fields` to the user's profile. Returns `None`
/// when the user has no profile.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    fields: &ProfileFields,
) -> Result<Option<Profile>> {
    let query = sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET \
             age = COALESCE($2, age), \
             gender = COALESCE($3, gender), \
             current_weight = COALESCE($4, current_weight), \
             height_cm = COALESCE($5, height_cm), \
             activity_level = COALESCE($6, activity_level), \
             goal = COALESCE($7, goal), \
             dietary_preferences = COALESCE($8, dietary_preferences), \
             allergies = COALESCE($9, allergies), \
             liked_foods = COALESCE($10, liked_foods), \
             disliked_foods = COALESCE($11, disliked_foods), \
             disabilities = COALESCE($12, disabilities), \
             medical_conditions = COALESCE($13, medical_conditions), \
             notification_reminders_enabled = COALESCE($14, notification_reminders_enabled), \
             email_reminders_enabled = COALESCE($15, email_reminders_enabled), \
             minutes_before_email_reminder = COALESCE($16, minutes_before_email_reminder), \
             tracking_enabled = COALESCE($17, tracking_enabled), \
             track_after_rest_timer = COALESCE($18, track_after_rest_timer), \
             start_rest_timer_after_exercise = COALESCE($19, start_rest_timer_after_exercise), \
             time_zone = COALESCE($20, time_zone), \
             breakfast_time = COALESCE($21, breakfast_time), \
             lunch_time = COALESCE($22, lunch_time), \
             dinner_time = COALESCE($23, dinner_time), \
             snack_time = COALESCE($24, snack_time), \
             workout_time = COALESCE($25, workout_time), \
             updated_at = now() \
         WHERE user_id = $1 \
         RETURNING *",
    )
    .bind(user_id);

    let profile = bind_fields(query, fields)
        .fetch_optional(pool)
        .await
        .context("failed to update profile")?;

    Ok(profile)
}

pub async fn get_profile(pool: &PgPool, id: Uuid) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch profile")?;

    Ok(profile)
}

pub async fn get_profile_for_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch profile for user")?;

    Ok(profile)
}

/// Set `connected_to_google_account`. Returns false when the user has no
/// profile yet.
pub async fn set_google_connected(pool: &PgPool, user_id: Uuid, connected: bool) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE profiles SET connected_to_google_account = $2, updated_at = now() \
         WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(connected)
    .execute(pool)
    .await
    .context("failed to update google connection flag")?;

    Ok(result.rows_affected() > 0)
}
