//! Profile service: creation, partial updates and the derived read view.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use fitpal_db::models::{GOOGLE_PROVIDER, Profile};
use fitpal_db::queries::{profiles as profile_queries, users as user_queries};

pub use fitpal_db::queries::profiles::ProfileFields as ProfileInput;

use crate::error::{FitpalError, Result};

/// A profile with its computed fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub bmi: Option<f64>,
    pub dietary_preferences_list: Vec<String>,
    pub allergies_list: Vec<String>,
    pub liked_foods_list: Vec<String>,
    pub disliked_foods_list: Vec<String>,
    pub disabilities_list: Vec<String>,
    pub medical_conditions_list: Vec<String>,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        Self {
            bmi: profile.bmi(),
            dietary_preferences_list: profile.dietary_preferences_list(),
            allergies_list: profile.allergies_list(),
            liked_foods_list: profile.liked_foods_list(),
            disliked_foods_list: profile.disliked_foods_list(),
            disabilities_list: profile.disabilities_list(),
            medical_conditions_list: profile.medical_conditions_list(),
            profile,
        }
    }
}

/// Estimated kcal burned: `MET * 3.5 * weight_kg / 200 * minutes`,
/// rounded to the nearest kcal. Zero when any input is missing or zero.
pub fn calculate_calories_burned(
    met_value: Option<f64>,
    weight_kg: Option<f64>,
    duration_mins: Option<i32>,
) -> i64 {
    match (met_value, weight_kg, duration_mins) {
        (Some(met), Some(weight), Some(mins)) if met > 0.0 && weight > 0.0 && mins > 0 => {
            (met * 3.5 * weight / 200.0 * f64::from(mins)).round() as i64
        }
        _ => 0,
    }
}

fn validate_input(input: &ProfileInput) -> Result<()> {
    if input.age.is_some_and(|a| !(1..=150).contains(&a)) {
        return Err(FitpalError::validation("age must be between 1 and 150"));
    }
    if input.current_weight.is_some_and(|w| !(w > 0.0)) {
        return Err(FitpalError::validation("current weight must be positive"));
    }
    if input.height_cm.is_some_and(|h| h <= 0) {
        return Err(FitpalError::validation("height must be positive"));
    }
    if input.minutes_before_email_reminder.is_some_and(|m| m < 0) {
        return Err(FitpalError::validation(
            "minutes before email reminder must not be negative",
        ));
    }
    if input.time_zone.as_deref().is_some_and(|tz| tz.trim().is_empty()) {
        return Err(FitpalError::validation("time zone must not be empty"));
    }
    Ok(())
}

/// Create the profile of `user_id`. The Google connection flag is taken
/// from the user's linked accounts.
pub async fn create_profile(pool: &PgPool, user_id: Uuid, input: &ProfileInput) -> Result<ProfileView> {
    validate_input(input)?;

    if user_queries::get_user(pool, user_id).await?.is_none() {
        return Err(FitpalError::not_found(format!("user {user_id}")));
    }
    if profile_queries::get_profile_for_user(pool, user_id).await?.is_some() {
        return Err(FitpalError::conflict(format!("user {user_id} already has a profile")));
    }

    let connected = user_queries::get_linked_account(pool, user_id, GOOGLE_PROVIDER)
        .await?
        .is_some();
    let profile = profile_queries::insert_profile(pool, user_id, input, connected).await?;

    info!(profile_id = %profile.id, %user_id, connected, "profile created");
    Ok(profile.into())
}

/// Apply the `Some` fields of `input` to the user's profile.
pub async fn update_profile(pool: &PgPool, user_id: Uuid, input: &ProfileInput) -> Result<ProfileView> {
    validate_input(input)?;

    let profile = profile_queries::update_profile(pool, user_id, input)
        .await?
        .ok_or_else(|| FitpalError::not_found(format!("profile of user {user_id}")))?;

    info!(profile_id = %profile.id, %user_id, "profile updated");
    Ok(profile.into())
}

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<ProfileView> {
    load_profile(pool, user_id).await.map(ProfileView::from)
}

/// The raw profile row of `user_id`, or `NotFound`.
pub async fn load_profile(pool: &PgPool, user_id: Uuid) -> Result<Profile> {
    profile_queries::get_profile_for_user(pool, user_id)
        .await?
        .ok_or_else(|| FitpalError::not_found(format!("profile of user {user_id}")))
}
