//! Strict validation of generated plan documents.
//!
//! The generator returns free-form JSON. [`validate_plan_document`] walks
//! the whole value, records every missing or mistyped field, and only
//! produces a typed [`PlanDocument`] when no issue was found.
//!
//! Shape:
//!
//! ```text
//! workout_days:   [{ day_of_week 1..=7, title, is_rest_day, description,
//!                    exercises: [{ name, sets, met_value, duration_mins,
//!                                  reps, rest_period_seconds, notes? }] }]
//! nutrition_days: [{ day_of_week 1..=7, target_calories?, target_protein_grams?,
//!                    target_carbs_grams?, target_fats_grams?,
//!                    target_water_litres?, notes?,
//!                    meals: [{ meal_type, description, calories, protein_grams,
//!                              carbs_grams, fats_grams, portion_size? }] }]
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use fitpal_db::models::MealType;

// ---------------------------------------------------------------------------
// Validated document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub workout_days: Vec<WorkoutDayDoc>,
    pub nutrition_days: Vec<NutritionDayDoc>,
}

impl PlanDocument {
    pub fn exercise_count(&self) -> usize {
        self.workout_days.iter().map(|d| d.exercises.len()).sum()
    }

    pub fn meal_count(&self) -> usize {
        self.nutrition_days.iter().map(|d| d.meals.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDayDoc {
    pub day_of_week: i32,
    pub title: String,
    pub is_rest_day: bool,
    pub description: String,
    pub exercises: Vec<ExerciseDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDoc {
    pub name: String,
    pub sets: i32,
    pub met_value: f64,
    pub duration_mins: i32,
    pub reps: String,
    pub rest_period_seconds: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionDayDoc {
    pub day_of_week: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_calories: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_protein_grams: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_carbs_grams: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_fats_grams: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_water_litres: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub meals: Vec<MealDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDoc {
    pub meal_type: MealType,
    pub description: String,
    pub calories: i32,
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fats_grams: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_size: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// One problem found in a plan document, addressed by a JSON-ish path such
/// as `workout_days[2].exercises[0].sets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub path: String,
    pub problem: String,
}

impl SchemaIssue {
    pub fn new(path: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.problem)
        } else {
            write!(f, "{}: {}", self.path, self.problem)
        }
    }
}

/// Every issue found in a rejected plan document. Never empty.
#[derive(Debug, Clone, Error)]
#[error("generated plan does not match the plan schema ({}): {}", .issues.len(), join_issues(.issues))]
pub struct SchemaValidationError {
    pub issues: Vec<SchemaIssue>,
}

impl SchemaValidationError {
    /// True if some issue sits exactly at `path`.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path == path)
    }
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a raw generated document against the plan schema.
///
/// Unknown keys are ignored. Optional fields may be absent or `null`.
pub fn validate_plan_document(raw: &Value) -> Result<PlanDocument, SchemaValidationError> {
    let mut walker = Walker::default();

    let document = match raw.as_object() {
        Some(root) => {
            let workout_days = walker.array(root, "", "workout_days").map(|items| {
                walker.each(items, "workout_days", |w, obj, path| w.workout_day(obj, path))
            });
            let nutrition_days = walker.array(root, "", "nutrition_days").map(|items| {
                walker.each(items, "nutrition_days", |w, obj, path| w.nutrition_day(obj, path))
            });
            if let Some(days) = &workout_days {
                walker.unique_days(days.iter().map(|d| d.day_of_week), "workout_days");
            }
            if let Some(days) = &nutrition_days {
                walker.unique_days(days.iter().map(|d| d.day_of_week), "nutrition_days");
            }
            workout_days.zip(nutrition_days)
        }
        None => {
            walker.issue("", format!("expected an object, got {}", kind(raw)));
            None
        }
    };

    match document {
        Some((workout_days, nutrition_days)) if walker.issues.is_empty() => Ok(PlanDocument {
            workout_days,
            nutrition_days,
        }),
        _ => Err(SchemaValidationError {
            issues: walker.issues,
        }),
    }
}

#[derive(Default)]
struct Walker {
    issues: Vec<SchemaIssue>,
}

impl Walker {
    fn issue(&mut self, path: impl Into<String>, problem: impl Into<String>) {
        self.issues.push(SchemaIssue::new(path, problem));
    }

    fn workout_day(&mut self, obj: &Map<String, Value>, path: &str) -> Option<WorkoutDayDoc> {
        let day_of_week = self.day_of_week(obj, path);
        let title = self.string(obj, path, "title");
        let is_rest_day = self.boolean(obj, path, "is_rest_day");
        let description = self.text(obj, path, "description");
        let exercises = self.array(obj, path, "exercises").map(|items| {
            let items_path = join(path, "exercises");
            self.each(items, &items_path, |w, obj, path| w.exercise(obj, path))
        });

        if let (Some(true), Some(list)) = (is_rest_day, &exercises) {
            if !list.is_empty() {
                self.issue(join(path, "exercises"), "a rest day must not list exercises");
            }
        }

        Some(WorkoutDayDoc {
            day_of_week: day_of_week?,
            title: title?,
            is_rest_day: is_rest_day?,
            description: description?,
            exercises: exercises?,
        })
    }

    fn exercise(&mut self, obj: &Map<String, Value>, path: &str) -> Option<ExerciseDoc> {
        let name = self.string(obj, path, "name");
        let sets = self.count(obj, path, "sets");
        let met_value = self.amount(obj, path, "met_value");
        let duration_mins = self.count(obj, path, "duration_mins");
        let reps = self.reps(obj, path);
        let rest_period_seconds = self.count(obj, path, "rest_period_seconds");
        let notes = self.optional_text(obj, path, "notes");

        Some(ExerciseDoc {
            name: name?,
            sets: sets?,
            met_value: met_value?,
            duration_mins: duration_mins?,
            reps: reps?,
            rest_period_seconds: rest_period_seconds?,
            notes: notes?,
        })
    }

    fn nutrition_day(&mut self, obj: &Map<String, Value>, path: &str) -> Option<NutritionDayDoc> {
        let day_of_week = self.day_of_week(obj, path);
        let target_calories = self.optional_count(obj, path, "target_calories");
        let target_protein_grams = self.optional_count(obj, path, "target_protein_grams");
        let target_carbs_grams = self.optional_count(obj, path, "target_carbs_grams");
        let target_fats_grams = self.optional_count(obj, path, "target_fats_grams");
        let target_water_litres = self.optional_amount(obj, path, "target_water_litres");
        let notes = self.optional_text(obj, path, "notes");
        let meals = self.array(obj, path, "meals").map(|items| {
            let items_path = join(path, "meals");
            self.each(items, &items_path, |w, obj, path| w.meal(obj, path))
        });

        Some(NutritionDayDoc {
            day_of_week: day_of_week?,
            target_calories: target_calories?,
            target_protein_grams: target_protein_grams?,
            target_carbs_grams: target_carbs_grams?,
            target_fats_grams: target_fats_grams?,
            target_water_litres: target_water_litres?,
            notes: notes?,
            meals: meals?,
        })
    }

    fn meal(&mut self, obj: &Map<String, Value>, path: &str) -> Option<MealDoc> {
        let meal_type = self.meal_type(obj, path);
        let description = self.string(obj, path, "description");
        let calories = self.count(obj, path, "calories");
        let protein_grams = self.amount(obj, path, "protein_grams");
        let carbs_grams = self.amount(obj, path, "carbs_grams");
        let fats_grams = self.amount(obj, path, "fats_grams");
        let portion_size = self.optional_text(obj, path, "portion_size");

        Some(MealDoc {
            meal_type: meal_type?,
            description: description?,
            calories: calories?,
            protein_grams: protein_grams?,
            carbs_grams: carbs_grams?,
            fats_grams: fats_grams?,
            portion_size: portion_size?,
        })
    }

    // -- containers ---------------------------------------------------------

    /// Run `item` on every element, reporting non-object elements. Elements
    /// that fail are dropped; their issues are already recorded.
    fn each<T>(
        &mut self,
        items: &[Value],
        path: &str,
        mut item: impl FnMut(&mut Self, &Map<String, Value>, &str) -> Option<T>,
    ) -> Vec<T> {
        let mut out = Vec::with_capacity(items.len());
        for (index, value) in items.iter().enumerate() {
            let item_path = format!("{path}[{index}]");
            match value.as_object() {
                Some(obj) => out.extend(item(self, obj, &item_path)),
                None => self.issue(item_path, format!("expected an object, got {}", kind(value))),
            }
        }
        out
    }

    fn array<'v>(&mut self, obj: &'v Map<String, Value>, path: &str, key: &str) -> Option<&'v [Value]> {
        match self.required(obj, path, key)? {
            Value::Array(items) => Some(items),
            other => {
                self.issue(join(path, key), format!("expected an array, got {}", kind(other)));
                None
            }
        }
    }

    fn unique_days(&mut self, days: impl Iterator<Item = i32>, path: &str) {
        let mut seen = HashSet::new();
        for day in days {
            if !seen.insert(day) {
                self.issue(path, format!("day_of_week {day} appears more than once"));
            }
        }
    }

    // -- scalars ------------------------------------------------------------

    fn required<'v>(&mut self, obj: &'v Map<String, Value>, path: &str, key: &str) -> Option<&'v Value> {
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.issue(join(path, key), "is required");
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Present and not null.
    fn optional<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
        obj.get(key).filter(|v| !v.is_null())
    }

    fn day_of_week(&mut self, obj: &Map<String, Value>, path: &str) -> Option<i32> {
        let value = self.required(obj, path, "day_of_week")?;
        match as_integral(value) {
            Some(day @ 1..=7) => i32::try_from(day).ok(),
            Some(day) => {
                self.issue(join(path, "day_of_week"), format!("must be between 1 and 7, got {day}"));
                None
            }
            None => {
                self.issue(join(path, "day_of_week"), format!("expected an integer, got {}", kind(value)));
                None
            }
        }
    }

    /// Non-empty string.
    fn string(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<String> {
        let text = self.text(obj, path, key)?;
        if text.trim().is_empty() {
            self.issue(join(path, key), "must not be empty");
            return None;
        }
        Some(text)
    }

    /// Any string, empty allowed.
    fn text(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<String> {
        match self.required(obj, path, key)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.issue(join(path, key), format!("expected a string, got {}", kind(other)));
                None
            }
        }
    }

    fn optional_text(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<Option<String>> {
        match Self::optional(obj, key) {
            None => Some(None),
            Some(Value::String(s)) => Some(Some(s.clone())),
            Some(other) => {
                self.issue(join(path, key), format!("expected a string, got {}", kind(other)));
                None
            }
        }
    }

    /// `reps` is free-form ("10-12", "AMRAP"), but a bare integer is taken
    /// as its decimal form.
    fn reps(&mut self, obj: &Map<String, Value>, path: &str) -> Option<String> {
        match self.required(obj, path, "reps")? {
            Value::String(s) if s.trim().is_empty() => {
                self.issue(join(path, "reps"), "must not be empty");
                None
            }
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.is_u64() => Some(n.to_string()),
            other => {
                self.issue(join(path, "reps"), format!("expected a string, got {}", kind(other)));
                None
            }
        }
    }

    fn boolean(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<bool> {
        match self.required(obj, path, key)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.issue(join(path, key), format!("expected a boolean, got {}", kind(other)));
                None
            }
        }
    }

    fn meal_type(&mut self, obj: &Map<String, Value>, path: &str) -> Option<MealType> {
        let value = self.required(obj, path, "meal_type")?;
        let parsed = value.as_str().and_then(|s| s.parse::<MealType>().ok());
        if parsed.is_none() {
            self.issue(
                join(path, "meal_type"),
                format!("expected one of breakfast, lunch, dinner, snack, got {value}"),
            );
        }
        parsed
    }

    /// Non-negative integer that fits in i32.
    fn count(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<i32> {
        let value = self.required(obj, path, key)?;
        self.count_value(value, &join(path, key))
    }

    fn optional_count(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<Option<i32>> {
        match Self::optional(obj, key) {
            None => Some(None),
            Some(value) => self.count_value(value, &join(path, key)).map(Some),
        }
    }

    fn count_value(&mut self, value: &Value, path: &str) -> Option<i32> {
        match as_integral(value) {
            Some(n) if n < 0 => {
                self.issue(path, format!("must not be negative, got {n}"));
                None
            }
            Some(n) => match i32::try_from(n) {
                Ok(n) => Some(n),
                Err(_) => {
                    self.issue(path, format!("{n} is out of range"));
                    None
                }
            },
            None => {
                self.issue(path, format!("expected a non-negative integer, got {}", kind(value)));
                None
            }
        }
    }

    /// Non-negative number, integer or fractional.
    fn amount(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<f64> {
        let value = self.required(obj, path, key)?;
        self.amount_value(value, &join(path, key))
    }

    fn optional_amount(&mut self, obj: &Map<String, Value>, path: &str, key: &str) -> Option<Option<f64>> {
        match Self::optional(obj, key) {
            None => Some(None),
            Some(value) => self.amount_value(value, &join(path, key)).map(Some),
        }
    }

    fn amount_value(&mut self, value: &Value, path: &str) -> Option<f64> {
        match value.as_f64() {
            Some(x) if x < 0.0 => {
                self.issue(path, format!("must not be negative, got {x}"));
                None
            }
            Some(x) => Some(x),
            None => {
                self.issue(path, format!("expected a number, got {}", kind(value)));
                None
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

/// Integers, plus fractional numbers with no fractional part (`3.0`).
fn as_integral(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
            .map(|f| f as i64)
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a fractional number",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid() -> Value {
        json!({
            "workout_days": [
                {
                    "day_of_week": 1,
                    "title": "Full body",
                    "is_rest_day": false,
                    "description": "Bodyweight circuit",
                    "exercises": [
                        {"name": "Squats", "sets": 3, "reps": "12", "met_value": 5.0,
                         "duration_mins": 10, "rest_period_seconds": 60},
                        {"name": "Plank", "sets": 3, "reps": "30s", "met_value": 3.8,
                         "duration_mins": 5, "rest_period_seconds": 45, "notes": null}
                    ]
                },
                {"day_of_week": 2, "title": "Rest", "is_rest_day": true,
                 "description": "", "exercises": []}
            ],
            "nutrition_days": [
                {
                    "day_of_week": 1,
                    "target_calories": 1800,
                    "target_water_litres": 2.5,
                    "meals": [
                        {"meal_type": "breakfast", "description": "Oats with groundnuts",
                         "calories": 420, "protein_grams": 14, "carbs_grams": 60.5,
                         "fats_grams": 12, "portion_size": "1 bowl"}
                    ]
                }
            ],
            "commentary": "ignored"
        })
    }

    #[test]
    fn accepts_well_formed_document() {
        let doc = validate_plan_document(&valid()).expect("document should validate");
        assert_eq!(doc.workout_days.len(), 2);
        assert_eq!(doc.exercise_count(), 2);
        assert_eq!(doc.meal_count(), 1);
        assert_eq!(doc.workout_days[0].exercises[1].notes, None);
        assert_eq!(doc.nutrition_days[0].target_protein_grams, None);
        assert_eq!(doc.nutrition_days[0].meals[0].meal_type, MealType::Breakfast);
    }

    #[test]
    fn rejects_non_object_root() {
        let err = validate_plan_document(&json!([1, 2])).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.issues[0].problem.contains("expected an object"));
    }

    #[test]
    fn reports_every_issue_with_paths() {
        let mut doc = valid();
        doc["workout_days"][0]["exercises"][0]["sets"] = json!(-1);
        doc["workout_days"][0]["exercises"][1]["met_value"] = json!("high");
        doc["workout_days"][1]["day_of_week"] = json!(8);
        doc["nutrition_days"][0]["meals"][0]["meal_type"] = json!("brunch");
        doc["nutrition_days"][0]["target_calories"] = json!(1800.5);

        let err = validate_plan_document(&doc).unwrap_err();
        assert_eq!(err.issues.len(), 5, "{err}");
        assert!(err.has_issue_at("workout_days[0].exercises[0].sets"));
        assert!(err.has_issue_at("workout_days[0].exercises[1].met_value"));
        assert!(err.has_issue_at("workout_days[1].day_of_week"));
        assert!(err.has_issue_at("nutrition_days[0].meals[0].meal_type"));
        assert!(err.has_issue_at("nutrition_days[0].target_calories"));
    }

    #[test]
    fn missing_and_null_required_fields() {
        let mut doc = valid();
        doc["workout_days"][0].as_object_mut().unwrap().remove("title");
        doc["nutrition_days"][0]["meals"][0]["calories"] = Value::Null;
        doc.as_object_mut().unwrap().remove("nutrition_days");

        let err = validate_plan_document(&doc).unwrap_err();
        assert!(err.has_issue_at("workout_days[0].title"));
        assert!(err.has_issue_at("nutrition_days"));
        assert!(err.issues.iter().all(|i| i.path != "nutrition_days[0].meals[0].calories"));
    }

    #[test]
    fn rest_day_with_exercises_is_rejected() {
        let mut doc = valid();
        doc["workout_days"][1]["exercises"] = doc["workout_days"][0]["exercises"].clone();
        let err = validate_plan_document(&doc).unwrap_err();
        assert!(err.has_issue_at("workout_days[1].exercises"));
    }

    #[test]
    fn duplicate_days_are_rejected() {
        let mut doc = valid();
        doc["workout_days"][1]["day_of_week"] = json!(1);
        let err = validate_plan_document(&doc).unwrap_err();
        assert!(err.has_issue_at("workout_days"));
        assert!(err.to_string().contains("appears more than once"));
    }

    #[test]
    fn integer_reps_and_nullable_optionals_are_accepted() {
        let mut doc = valid();
        doc["workout_days"][0]["exercises"][0]["reps"] = json!(15);
        doc["nutrition_days"][0]["notes"] = Value::Null;
        let parsed = validate_plan_document(&doc).unwrap();
        assert_eq!(parsed.workout_days[0].exercises[0].reps, "15");
    }

    #[test]
    fn whole_floats_count_as_integers() {
        let mut doc = valid();
        doc["workout_days"][0]["day_of_week"] = json!(1.0);
        doc["workout_days"][0]["exercises"][0]["sets"] = json!(3.0);
        doc["nutrition_days"][0]["meals"][0]["calories"] = json!(450.0);
        let parsed = validate_plan_document(&doc).expect("whole floats are accepted");
        assert_eq!(parsed.workout_days[0].day_of_week, 1);
        assert_eq!(parsed.workout_days[0].exercises[0].sets, 3);
        assert_eq!(parsed.nutrition_days[0].meals[0].calories, 450);

        doc["workout_days"][0]["exercises"][0]["sets"] = json!(2.5);
        let err = validate_plan_document(&doc).unwrap_err();
        assert!(err.has_issue_at("workout_days[0].exercises[0].sets"));
    }

    #[test]
    fn non_object_list_items_are_reported() {
        let mut doc = valid();
        doc["nutrition_days"][0]["meals"] = json!(["rice"]);
        let err = validate_plan_document(&doc).unwrap_err();
        assert!(err.has_issue_at("nutrition_days[0].meals[0]"));
    }

    #[test]
    fn error_message_lists_issues() {
        let err = SchemaValidationError {
            issues: vec![
                SchemaIssue::new("workout_days", "is required"),
                SchemaIssue::new("nutrition_days", "is required"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "generated plan does not match the plan schema (2): \
             workout_days: is required; nutrition_days: is required"
        );
    }

    #[test]
    fn validated_document_serializes_back_to_a_valid_document() {
        let doc = validate_plan_document(&valid()).unwrap();
        let again = validate_plan_document(&serde_json::to_value(&doc).unwrap()).unwrap();
        assert_eq!(doc, again);
    }
}
