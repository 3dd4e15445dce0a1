//! Offline [`PlanGenerator`] that returns a fixed bodyweight and Ghanaian
//! meal week. Used when no generative backend is configured.

use async_trait::async_trait;

use fitpal_db::models::MealType;

use super::generator::{GenerationError, PlanGenerator};
use super::schema::{ExerciseDoc, MealDoc, NutritionDayDoc, PlanDocument, WorkoutDayDoc};

/// (name, sets, reps, rest seconds, minutes, MET, note)
type ExerciseRow = (&'static str, i32, &'static str, i32, i32, f64, &'static str);

const FULL_BODY: &[ExerciseRow] = &[
    ("Push-ups", 3, "8-12", 60, 8, 3.8, "Keep your core tight and body straight"),
    ("Squats", 3, "12-15", 60, 10, 5.0, "Keep your knees behind your toes"),
    ("Plank", 3, "30-60 seconds", 60, 5, 3.8, "Hold the position steadily"),
];

const CARDIO_CORE: &[ExerciseRow] = &[
    ("Jumping Jacks", 3, "20-30", 45, 10, 8.0, "Land softly on your feet"),
    ("Mountain Climbers", 3, "15-20", 45, 8, 8.0, "Keep your core engaged"),
];

const STRENGTH: &[ExerciseRow] = &[
    ("Lunges", 3, "10-12 each leg", 60, 10, 4.0, "Step forward and lower your back knee"),
    ("Wall Push-ups", 3, "12-15", 60, 6, 3.0, "Great for beginners"),
];

const ACTIVE_RECOVERY: &[ExerciseRow] = &[(
    "Walking",
    1,
    "20-30 minutes",
    0,
    30,
    3.5,
    "Maintain a steady, comfortable pace",
)];

/// (day, title, description, exercises); an empty list marks a rest day.
const WEEK: [(i32, &str, &str, &[ExerciseRow]); 7] = [
    (1, "Full Body Workout", "A full-body session using bodyweight exercises", FULL_BODY),
    (2, "Rest Day", "Active recovery: light walking or stretching", &[]),
    (3, "Cardio & Core", "Cardiovascular work and core strengthening", CARDIO_CORE),
    (4, "Rest Day", "Complete rest or gentle stretching", &[]),
    (5, "Strength Training", "Build strength with bodyweight exercises", STRENGTH),
    (6, "Active Recovery", "Light activity and mobility work", ACTIVE_RECOVERY),
    (7, "Rest Day", "Complete rest day", &[]),
];

/// (type, description, calories, protein, carbs, fats, portion)
type MealRow = (MealType, &'static str, i32, f64, f64, f64, &'static str);

const MENUS: [[MealRow; 4]; 2] = [
    [
        (MealType::Breakfast, "Porridge with groundnuts and banana", 450, 18.0, 65.0, 12.0, "1 bowl"),
        (MealType::Lunch, "Jollof rice with grilled chicken and vegetables", 600, 35.0, 70.0, 18.0, "1 plate"),
        (MealType::Snack, "Roasted plantain with groundnuts", 200, 8.0, 30.0, 6.0, "1 medium plantain"),
        (MealType::Dinner, "Banku with tilapia and okra soup", 550, 30.0, 45.0, 20.0, "1 portion"),
    ],
    [
        (MealType::Breakfast, "Hausa koko with koose", 400, 15.0, 60.0, 11.0, "1 cup with 3 koose"),
        (MealType::Lunch, "Waakye with boiled egg and shito", 620, 28.0, 85.0, 16.0, "1 plate"),
        (MealType::Snack, "Pawpaw and pineapple slices", 150, 2.0, 36.0, 0.5, "1 bowl"),
        (MealType::Dinner, "Kenkey with grilled fish and pepper sauce", 520, 32.0, 70.0, 10.0, "1 ball"),
    ],
];

pub fn template_plan() -> PlanDocument {
    let workout_days = WEEK
        .iter()
        .map(|(day, title, description, exercises)| WorkoutDayDoc {
            day_of_week: *day,
            title: (*title).to_owned(),
            is_rest_day: exercises.is_empty(),
            description: (*description).to_owned(),
            exercises: exercises
                .iter()
                .map(|(name, sets, reps, rest, mins, met, note)| ExerciseDoc {
                    name: (*name).to_owned(),
                    sets: *sets,
                    met_value: *met,
                    duration_mins: *mins,
                    reps: (*reps).to_owned(),
                    rest_period_seconds: *rest,
                    notes: Some((*note).to_owned()),
                })
                .collect(),
        })
        .collect();

    let nutrition_days = (1..=7)
        .map(|day: i32| {
            let index = usize::try_from(day).unwrap_or_default() % MENUS.len();
            let meals: Vec<MealDoc> = MENUS[index]
                .iter()
                .map(|(meal_type, description, calories, protein, carbs, fats, portion)| MealDoc {
                    meal_type: *meal_type,
                    description: (*description).to_owned(),
                    calories: *calories,
                    protein_grams: *protein,
                    carbs_grams: *carbs,
                    fats_grams: *fats,
                    portion_size: Some((*portion).to_owned()),
                })
                .collect();
            NutritionDayDoc {
                day_of_week: day,
                target_calories: Some(meals.iter().map(|m| m.calories).sum()),
                target_protein_grams: None,
                target_carbs_grams: None,
                target_fats_grams: None,
                target_water_litres: Some(2.5),
                notes: Some("Drink water steadily through the day".to_owned()),
                meals,
            }
        })
        .collect();

    PlanDocument {
        workout_days,
        nutrition_days,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplatePlanGenerator;

#[async_trait]
impl PlanGenerator for TemplatePlanGenerator {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        serde_json::to_string(&template_plan())
            .map_err(|e| GenerationError::Transport(format!("failed to encode template plan: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::schema::validate_plan_document;

    #[tokio::test]
    async fn template_output_passes_validation() {
        let raw = TemplatePlanGenerator.generate("ignored").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let doc = validate_plan_document(&value).expect("template must validate");

        assert_eq!(doc.workout_days.len(), 7);
        assert_eq!(doc.nutrition_days.len(), 7);
        assert_eq!(doc.workout_days.iter().filter(|d| d.is_rest_day).count(), 3);
        assert_eq!(doc.exercise_count(), 8);
        assert_eq!(doc.meal_count(), 28);
    }

    #[test]
    fn daily_calorie_target_matches_meals() {
        let doc = template_plan();
        assert_eq!(doc.nutrition_days[0].target_calories, Some(1690));
        assert_eq!(doc.nutrition_days[1].target_calories, Some(1800));
    }
}
