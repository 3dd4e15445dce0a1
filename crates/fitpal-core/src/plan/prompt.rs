//! Prompt construction for plan generation. Pure string assembly.

use chrono::{Datelike, NaiveDate};

use fitpal_db::models::{ActivityLevel, Goal, Profile};

const NOT_SPECIFIED: &str = "None specified";

const INSTRUCTIONS: &str = "\
## Instructions

- The response MUST be a single JSON object matching the provided schema.
- The nutrition plan must focus on common, accessible Ghanaian foods.
- Workouts should need minimal or no gym equipment. They do not have to be localized.
- Populate every field of the schema. A rest day has an empty `exercises` list.
- `day_of_week` is 1 for Monday through 7 for Sunday and must match the plan dates.
- The plan covers at most 7 days, one entry per day of week in each list.
- `met_value` is the MET intensity of the exercise; `duration_mins` its total time.
";

fn goal_label(goal: Goal) -> &'static str {
    match goal {
        Goal::WeightLoss => "Weight Loss",
        Goal::Maintenance => "Maintenance",
        Goal::MuscleGain => "Muscle Gain",
        Goal::Endurance => "Endurance",
    }
}

fn activity_label(level: ActivityLevel) -> &'static str {
    match level {
        ActivityLevel::Sedentary => "Sedentary (little or no exercise)",
        ActivityLevel::LightlyActive => "Lightly Active (1-3 days/week)",
        ActivityLevel::ModeratelyActive => "Moderately Active (3-5 days/week)",
        ActivityLevel::VeryActive => "Very Active (6-7 days/week)",
        ActivityLevel::Athlete => "Athlete (twice a day)",
    }
}

fn or_unspecified(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() { NOT_SPECIFIED } else { trimmed }
}

fn opt_line<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => NOT_SPECIFIED.to_owned(),
    }
}

/// Build the generation prompt for a 7-day plan starting on `start_date`.
pub fn build_plan_prompt(profile: &Profile, start_date: NaiveDate) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str("# Weekly Fitness and Nutrition Plan\n\n");
    prompt.push_str(
        "Generate a comprehensive 7-day fitness and nutrition plan for a user in Ghana.\n\n",
    );

    prompt.push_str("## User Details\n\n");
    prompt.push_str(&format!("- Age: {}\n", opt_line(profile.age, "")));
    prompt.push_str(&format!("- Gender: {}\n", opt_line(profile.gender, "")));
    prompt.push_str(&format!("- Weight: {}\n", opt_line(profile.current_weight, " kg")));
    prompt.push_str(&format!("- Height: {}\n", opt_line(profile.height_cm, " cm")));
    prompt.push_str(&format!(
        "- Goal: {}\n",
        profile.goal.map_or(NOT_SPECIFIED, goal_label)
    ));
    prompt.push_str(&format!(
        "- Activity Level: {}\n",
        profile.activity_level.map_or(NOT_SPECIFIED, activity_label)
    ));
    for (label, raw) in [
        ("Dietary Preferences", &profile.dietary_preferences),
        ("Allergies", &profile.allergies),
        ("Liked Foods", &profile.liked_foods),
        ("Disliked Foods", &profile.disliked_foods),
        ("Disabilities", &profile.disabilities),
        ("Medical Conditions", &profile.medical_conditions),
    ] {
        prompt.push_str(&format!("- {label}: {}\n", or_unspecified(raw)));
    }

    prompt.push_str("\n## Plan Details\n\n");
    prompt.push_str(&format!(
        "- Start Date: {start_date} (weekday {})\n\n",
        start_date.weekday().number_from_monday()
    ));

    prompt.push_str(INSTRUCTIONS);
    prompt
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    use super::*;

    fn profile() -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            age: Some(34),
            gender: None,
            current_weight: Some(82.5),
            height_cm: Some(180),
            activity_level: Some(ActivityLevel::LightlyActive),
            goal: Some(Goal::MuscleGain),
            dietary_preferences: String::new(),
            allergies: "groundnuts".to_string(),
            liked_foods: "waakye, fufu".to_string(),
            disliked_foods: "  ".to_string(),
            disabilities: String::new(),
            medical_conditions: String::new(),
            notification_reminders_enabled: true,
            email_reminders_enabled: false,
            minutes_before_email_reminder: 30,
            tracking_enabled: true,
            track_after_rest_timer: false,
            start_rest_timer_after_exercise: false,
            time_zone: "Africa/Accra".to_string(),
            breakfast_time: None,
            lunch_time: None,
            dinner_time: None,
            snack_time: None,
            workout_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            connected_to_google_account: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn prompt_includes_profile_details() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let prompt = build_plan_prompt(&profile(), start);

        assert!(prompt.contains("- Age: 34\n"));
        assert!(prompt.contains("- Weight: 82.5 kg\n"));
        assert!(prompt.contains("- Goal: Muscle Gain\n"));
        assert!(prompt.contains("- Allergies: groundnuts\n"));
        assert!(prompt.contains("- Liked Foods: waakye, fufu\n"));
        assert!(prompt.contains("- Start Date: 2025-03-12 (weekday 3)"));
    }

    #[test]
    fn blank_fields_are_marked_unspecified() {
        let prompt = build_plan_prompt(&profile(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert!(prompt.contains("- Gender: None specified\n"));
        assert!(prompt.contains("- Disliked Foods: None specified\n"));
        assert!(prompt.contains("Ghanaian foods"));
    }
}
