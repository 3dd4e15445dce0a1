use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Provider key stored in `linked_accounts.provider` for Google accounts.
pub const GOOGLE_PROVIDER: &str = "google";

/// Number of days covered by a plan, start and end inclusive.
pub const PLAN_LENGTH_DAYS: u64 = 7;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Error returned when a text column or CLI argument does not name a known
/// enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}

/// Implements `as_str`, `Display`, `FromStr` and `ALL` for a fieldless enum
/// stored as snake_case text.
macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$(Self::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = EnumParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(EnumParseError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

text_enum!(Gender, "gender", { Male => "male", Female => "female" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    Athlete,
}

text_enum!(ActivityLevel, "activity level", {
    Sedentary => "sedentary",
    LightlyActive => "lightly_active",
    ModeratelyActive => "moderately_active",
    VeryActive => "very_active",
    Athlete => "athlete",
});

/// Fitness goal a plan is generated towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    Maintenance,
    MuscleGain,
    Endurance,
}

text_enum!(Goal, "goal", {
    WeightLoss => "weight_loss",
    Maintenance => "maintenance",
    MuscleGain => "muscle_gain",
    Endurance => "endurance",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

text_enum!(MealType, "meal type", {
    Breakfast => "breakfast",
    Lunch => "lunch",
    Dinner => "dinner",
    Snack => "snack",
});

impl MealType {
    /// Capitalized form used in calendar summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snack => "Snack",
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts and profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// OAuth credentials for an external provider, as handed over by the
/// identity layer.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub linked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    /// Kilograms.
    pub current_weight: Option<f64>,
    pub height_cm: Option<i32>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
    pub dietary_preferences: String,
    pub allergies: String,
    pub liked_foods: String,
    pub disliked_foods: String,
    pub disabilities: String,
    pub medical_conditions: String,
    pub notification_reminders_enabled: bool,
    pub email_reminders_enabled: bool,
    pub minutes_before_email_reminder: i32,
    pub tracking_enabled: bool,
    pub track_after_rest_timer: bool,
    pub start_rest_timer_after_exercise: bool,
    pub time_zone: String,
    pub breakfast_time: Option<NaiveTime>,
    pub lunch_time: Option<NaiveTime>,
    pub dinner_time: Option<NaiveTime>,
    pub snack_time: Option<NaiveTime>,
    pub workout_time: NaiveTime,
    pub connected_to_google_account: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Body mass index rounded to two decimals, if weight and height are known.
    pub fn bmi(&self) -> Option<f64> {
        let weight = self.current_weight?;
        let height = self.height_cm.filter(|h| *h > 0)?;
        let metres = f64::from(height) / 100.0;
        Some((weight / (metres * metres) * 100.0).round() / 100.0)
    }

    pub fn dietary_preferences_list(&self) -> Vec<String> {
        split_list(&self.dietary_preferences)
    }

    pub fn allergies_list(&self) -> Vec<String> {
        split_list(&self.allergies)
    }

    pub fn liked_foods_list(&self) -> Vec<String> {
        split_list(&self.liked_foods)
    }

    pub fn disliked_foods_list(&self) -> Vec<String> {
        split_list(&self.disliked_foods)
    }

    pub fn disabilities_list(&self) -> Vec<String> {
        split_list(&self.disabilities)
    }

    pub fn medical_conditions_list(&self) -> Vec<String> {
        split_list(&self.medical_conditions)
    }

    /// The configured time for a meal slot, if the user set one.
    pub fn meal_time(&self, meal_type: MealType) -> Option<NaiveTime> {
        match meal_type {
            MealType::Breakfast => self.breakfast_time,
            MealType::Lunch => self.lunch_time,
            MealType::Dinner => self.dinner_time,
            MealType::Snack => self.snack_time,
        }
    }
}

/// Split a comma-delimited preference field into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FitnessPlan {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub goal_at_creation: Option<Goal>,
    pub ai_prompt_text: String,
    pub ai_response_raw: Option<serde_json::Value>,
    pub workout_added_to_calendar: bool,
    pub nutrition_added_to_calendar: bool,
    pub external_calendar_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FitnessPlan {
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }

    /// Calendar date of a 1-based day of the week within this plan.
    pub fn date_for_day(&self, day_of_week: i32) -> Option<NaiveDate> {
        let offset = u64::try_from(day_of_week.checked_sub(1)?).ok()?;
        self.start_date.checked_add_days(Days::new(offset))
    }
}

/// Last day of a plan starting on `start_date`.
pub fn plan_end_date(start_date: NaiveDate) -> Option<NaiveDate> {
    start_date.checked_add_days(Days::new(PLAN_LENGTH_DAYS - 1))
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub day_of_week: i32,
    pub title: String,
    pub description: String,
    pub is_rest_day: bool,
    pub external_event_id: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub workout_day_id: Uuid,
    pub position: i32,
    pub name: String,
    pub sets: i32,
    pub reps: String,
    pub rest_period_seconds: i32,
    pub duration_mins: i32,
    pub met_value: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NutritionDay {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub day_of_week: i32,
    pub target_calories: Option<i32>,
    pub target_protein_grams: Option<i32>,
    pub target_carbs_grams: Option<i32>,
    pub target_fats_grams: Option<i32>,
    pub target_water_litres: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub nutrition_day_id: Uuid,
    pub position: i32,
    pub meal_type: MealType,
    pub description: String,
    pub calories: i32,
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fats_grams: f64,
    pub portion_size: Option<String>,
    pub external_event_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WorkoutTracking {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub user_id: Uuid,
    pub date_completed: NaiveDate,
    pub sets_completed: i32,
    pub calories_burned: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MealTracking {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub user_id: Uuid,
    pub date_completed: NaiveDate,
    pub portion_consumed: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WaterTracking {
    pub id: Uuid,
    pub nutrition_day_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub litres_consumed: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            age: Some(30),
            gender: Some(Gender::Female),
            current_weight: Some(70.0),
            height_cm: Some(175),
            activity_level: Some(ActivityLevel::ModeratelyActive),
            goal: Some(Goal::WeightLoss),
            dietary_preferences: " vegetarian, ,low salt ".to_string(),
            allergies: String::new(),
            liked_foods: "banku,kelewele".to_string(),
            disliked_foods: String::new(),
            disabilities: String::new(),
            medical_conditions: String::new(),
            notification_reminders_enabled: true,
            email_reminders_enabled: true,
            minutes_before_email_reminder: 30,
            tracking_enabled: true,
            track_after_rest_timer: false,
            start_rest_timer_after_exercise: false,
            time_zone: "UTC".to_string(),
            breakfast_time: None,
            lunch_time: NaiveTime::from_hms_opt(13, 0, 0),
            dinner_time: None,
            snack_time: None,
            workout_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            connected_to_google_account: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn enum_text_roundtrip() {
        for goal in Goal::ALL {
            assert_eq!(goal.as_str().parse::<Goal>().unwrap(), *goal);
        }
        for level in ActivityLevel::ALL {
            assert_eq!(level.to_string().parse::<ActivityLevel>().unwrap(), *level);
        }
        assert_eq!("snack".parse::<MealType>().unwrap(), MealType::Snack);
    }

    #[test]
    fn enum_parse_error_names_kind() {
        let err = "brunch".parse::<MealType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid meal type: \"brunch\"");
    }

    #[test]
    fn bmi_rounds_to_two_decimals() {
        assert_eq!(profile().bmi(), Some(22.86));
    }

    #[test]
    fn bmi_absent_without_height() {
        let mut p = profile();
        p.height_cm = None;
        assert_eq!(p.bmi(), None);
    }

    #[test]
    fn preference_lists_are_trimmed() {
        let p = profile();
        assert_eq!(p.dietary_preferences_list(), vec!["vegetarian", "low salt"]);
        assert_eq!(p.liked_foods_list(), vec!["banku", "kelewele"]);
        assert!(p.allergies_list().is_empty());
    }

    #[test]
    fn meal_time_lookup() {
        let p = profile();
        assert_eq!(p.meal_time(MealType::Lunch), NaiveTime::from_hms_opt(13, 0, 0));
        assert_eq!(p.meal_time(MealType::Dinner), None);
    }

    #[test]
    fn plan_day_arithmetic() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let plan = FitnessPlan {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            start_date: start,
            end_date: plan_end_date(start).unwrap(),
            goal_at_creation: None,
            ai_prompt_text: String::new(),
            ai_response_raw: None,
            workout_added_to_calendar: false,
            nutrition_added_to_calendar: false,
            external_calendar_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(plan.end_date, NaiveDate::from_ymd_opt(2025, 3, 16).unwrap());
        assert_eq!(plan.date_for_day(3), NaiveDate::from_ymd_opt(2025, 3, 12));
        assert_eq!(plan.date_for_day(0), None);
        assert!(plan.is_active(start));
        assert!(plan.is_active(plan.end_date));
        assert!(!plan.is_active(NaiveDate::from_ymd_opt(2025, 3, 17).unwrap()));
    }
}
