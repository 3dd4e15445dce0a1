//! Building calendar events from plan rows. Pure; no I/O.

use chrono::{NaiveDate, NaiveTime, TimeDelta};

use fitpal_db::models::{Exercise, FitnessPlan, Meal, MealType, NutritionDay, Profile, WorkoutDay};

use super::provider::{EventRequest, Reminder, ReminderMethod};

const POPUP_MINUTES: i32 = 5;
const EVENT_MINUTES: i64 = 60;

/// Clock time used for a meal when the profile sets none.
pub fn default_meal_time(meal_type: MealType) -> NaiveTime {
    let (h, m) = match meal_type {
        MealType::Breakfast => (8, 0),
        MealType::Lunch => (12, 30),
        MealType::Dinner => (19, 0),
        MealType::Snack => (15, 0),
    };
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

pub fn meal_time(profile: &Profile, meal_type: MealType) -> NaiveTime {
    profile
        .meal_time(meal_type)
        .unwrap_or_else(|| default_meal_time(meal_type))
}

/// A popup 5 minutes ahead, plus an email at the profile's lead time when
/// email reminders are on.
pub fn reminders_for(profile: &Profile) -> Vec<Reminder> {
    let mut reminders = vec![Reminder {
        method: ReminderMethod::Popup,
        minutes: POPUP_MINUTES,
    }];
    if profile.email_reminders_enabled {
        reminders.push(Reminder {
            method: ReminderMethod::Email,
            minutes: profile.minutes_before_email_reminder,
        });
    }
    reminders
}

fn timed_event(
    date: NaiveDate,
    time: NaiveTime,
    summary: String,
    description: String,
    profile: &Profile,
) -> EventRequest {
    let start = date.and_time(time);
    EventRequest {
        summary,
        description,
        start,
        end: start + TimeDelta::minutes(EVENT_MINUTES),
        time_zone: profile.time_zone.clone(),
        reminders: reminders_for(profile),
    }
}

/// The event for a workout day, placed `day_of_week - 1` days after the
/// plan start at the profile's workout time. `None` for rest days or a day
/// outside the representable range.
pub fn workout_event(
    plan: &FitnessPlan,
    day: &WorkoutDay,
    exercises: &[Exercise],
    profile: &Profile,
) -> Option<EventRequest> {
    if day.is_rest_day {
        return None;
    }
    let date = plan.date_for_day(day.day_of_week)?;

    let mut description = String::from("Your scheduled workout for the day.\n\nExercises:");
    for ex in exercises {
        description.push_str(&format!("\n- {} ({} sets of {})", ex.name, ex.sets, ex.reps));
    }

    Some(timed_event(
        date,
        profile.workout_time,
        format!("💪 Workout: {}", day.title),
        description,
        profile,
    ))
}

pub fn meal_event(
    plan: &FitnessPlan,
    day: &NutritionDay,
    meal: &Meal,
    profile: &Profile,
) -> Option<EventRequest> {
    let date = plan.date_for_day(day.day_of_week)?;

    let mut description = String::new();
    if let Some(portion) = meal.portion_size.as_deref().filter(|p| !p.trim().is_empty()) {
        description.push_str(&format!("Portion: {portion}\n"));
    }
    description.push_str(&format!("Calories: {} kcal", meal.calories));

    Some(timed_event(
        date,
        meal_time(profile, meal.meal_type),
        format!("🥗 {}: {}", meal.meal_type.label(), meal.description),
        description,
        profile,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use fitpal_db::models::plan_end_date;

    fn profile() -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            age: None,
            gender: None,
            current_weight: Some(70.0),
            height_cm: None,
            activity_level: None,
            goal: None,
            dietary_preferences: String::new(),
            allergies: String::new(),
            liked_foods: String::new(),
            disliked_foods: String::new(),
            disabilities: String::new(),
            medical_conditions: String::new(),
            notification_reminders_enabled: true,
            email_reminders_enabled: false,
            minutes_before_email_reminder: 45,
            tracking_enabled: true,
            track_after_rest_timer: false,
            start_rest_timer_after_exercise: false,
            time_zone: "Africa/Accra".into(),
            breakfast_time: None,
            lunch_time: None,
            dinner_time: NaiveTime::from_hms_opt(18, 15, 0),
            snack_time: None,
            workout_time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
            connected_to_google_account: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn plan() -> FitnessPlan {
        let start = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        FitnessPlan {
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
        }
    }

    fn workout_day(day_of_week: i32, is_rest_day: bool) -> WorkoutDay {
        WorkoutDay {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            day_of_week,
            title: "Leg day".into(),
            description: String::new(),
            is_rest_day,
            external_event_id: None,
        }
    }

    fn exercise(name: &str, sets: i32, reps: &str) -> Exercise {
        Exercise {
            id: Uuid::new_v4(),
            workout_day_id: Uuid::new_v4(),
            position: 0,
            name: name.into(),
            sets,
            reps: reps.into(),
            rest_period_seconds: 60,
            duration_mins: 10,
            met_value: 5.0,
            notes: None,
        }
    }

    fn meal(meal_type: MealType, portion: Option<&str>) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            nutrition_day_id: Uuid::new_v4(),
            position: 0,
            meal_type,
            description: "Waakye with egg".into(),
            calories: 620,
            protein_grams: 28.0,
            carbs_grams: 85.0,
            fats_grams: 16.0,
            portion_size: portion.map(str::to_owned),
            external_event_id: None,
        }
    }

    fn nutrition_day(day_of_week: i32) -> NutritionDay {
        NutritionDay {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            day_of_week,
            target_calories: None,
            target_protein_grams: None,
            target_carbs_grams: None,
            target_fats_grams: None,
            target_water_litres: None,
            notes: None,
        }
    }

    #[test]
    fn workout_event_is_offset_from_plan_start() {
        let exercises = [exercise("Squats", 3, "12"), exercise("Plank", 2, "30s")];
        let event = workout_event(&plan(), &workout_day(3, false), &exercises, &profile()).unwrap();

        let expected = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        assert_eq!(event.start, expected);
        assert_eq!(event.end - event.start, TimeDelta::hours(1));
        assert_eq!(event.summary, "💪 Workout: Leg day");
        assert_eq!(
            event.description,
            "Your scheduled workout for the day.\n\nExercises:\n- Squats (3 sets of 12)\n- Plank (2 sets of 30s)"
        );
        assert_eq!(event.time_zone, "Africa/Accra");
    }

    #[test]
    fn rest_days_have_no_event() {
        assert!(workout_event(&plan(), &workout_day(2, true), &[], &profile()).is_none());
    }

    #[test]
    fn meal_event_uses_profile_time_or_default() {
        let p = profile();
        let dinner = meal_event(&plan(), &nutrition_day(1), &meal(MealType::Dinner, Some("1 plate")), &p).unwrap();
        assert_eq!(dinner.start.time(), NaiveTime::from_hms_opt(18, 15, 0).unwrap());
        assert_eq!(dinner.start.date(), NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
        assert_eq!(dinner.summary, "🥗 Dinner: Waakye with egg");
        assert_eq!(dinner.description, "Portion: 1 plate\nCalories: 620 kcal");

        let lunch = meal_event(&plan(), &nutrition_day(7), &meal(MealType::Lunch, None), &p).unwrap();
        assert_eq!(lunch.start.time(), NaiveTime::from_hms_opt(12, 30, 0).unwrap());
        assert_eq!(lunch.start.date(), NaiveDate::from_ymd_opt(2025, 3, 18).unwrap());
        assert_eq!(lunch.description, "Calories: 620 kcal");
    }

    #[test]
    fn default_meal_times() {
        assert_eq!(default_meal_time(MealType::Breakfast), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(default_meal_time(MealType::Snack), NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert_eq!(default_meal_time(MealType::Dinner), NaiveTime::from_hms_opt(19, 0, 0).unwrap());
    }

    #[test]
    fn email_reminder_follows_profile_toggle() {
        let mut p = profile();
        assert_eq!(
            reminders_for(&p),
            vec![Reminder {
                method: ReminderMethod::Popup,
                minutes: 5
            }]
        );

        p.email_reminders_enabled = true;
        let reminders = reminders_for(&p);
        assert_eq!(reminders.len(), 2);
        assert_eq!(
            reminders[1],
            Reminder {
                method: ReminderMethod::Email,
                minutes: 45
            }
        );
    }
}
