#![allow(dead_code)]
//! Fakes and fixtures shared by the fitpal-core integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};
use sqlx::PgPool;

use fitpal_core::calendar::{
    CalendarError, CalendarPage, CalendarProvider, CalendarSummary, Credentials, EventRequest,
    NewCalendar,
};
use fitpal_core::plan::{GenerationError, PlanAggregate, PlanGenerator, ingest_plan, validate_plan_document};
use fitpal_db::models::Profile;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Day 1 Full Body (Squats, Push-ups), day 2 rest, day 3 Cardio (Jog),
/// day 4 Strength (Lunges). Nutrition on days 1 (two meals, 3 L) and
/// 2 (one meal, 2 L).
pub fn plan_json() -> Value {
    json!({
        "workout_days": [
            {"day_of_week": 1, "title": "Full Body", "is_rest_day": false, "description": "Bodyweight",
             "exercises": [
                {"name": "Squats", "sets": 3, "reps": "12", "rest_period_seconds": 60,
                 "duration_mins": 10, "met_value": 5.0},
                {"name": "Push-ups", "sets": 3, "reps": "10", "rest_period_seconds": 60,
                 "duration_mins": 8, "met_value": 3.8, "notes": "Knees allowed"}
             ]},
            {"day_of_week": 2, "title": "Rest", "is_rest_day": true, "description": "Recover",
             "exercises": []},
            {"day_of_week": 3, "title": "Cardio", "is_rest_day": false, "description": "Steady pace",
             "exercises": [
                {"name": "Jog", "sets": 1, "reps": "20 minutes", "rest_period_seconds": 0,
                 "duration_mins": 20, "met_value": 7.0}
             ]},
            {"day_of_week": 4, "title": "Strength", "is_rest_day": false, "description": "Legs",
             "exercises": [
                {"name": "Lunges", "sets": 3, "reps": "10 each leg", "rest_period_seconds": 60,
                 "duration_mins": 10, "met_value": 4.0}
             ]}
        ],
        "nutrition_days": [
            {"day_of_week": 1, "target_calories": 1800, "target_water_litres": 3.0,
             "meals": [
                {"meal_type": "breakfast", "description": "Oats with groundnuts", "calories": 420,
                 "protein_grams": 14, "carbs_grams": 60, "fats_grams": 12, "portion_size": "1 bowl"},
                {"meal_type": "lunch", "description": "Jollof with chicken", "calories": 650,
                 "protein_grams": 35, "carbs_grams": 75, "fats_grams": 18}
             ]},
            {"day_of_week": 2, "target_water_litres": 2.0,
             "meals": [
                {"meal_type": "dinner", "description": "Banku with tilapia", "calories": 560,
                 "protein_grams": 32, "carbs_grams": 50, "fats_grams": 20}
             ]}
        ]
    })
}

/// Ingest [`plan_json`] for `profile` starting on `start`.
pub async fn seed_plan(pool: &PgPool, profile: &Profile, start: NaiveDate) -> PlanAggregate {
    let raw = plan_json();
    let document = validate_plan_document(&raw).expect("fixture document is valid");
    ingest_plan(pool, profile, start, "test prompt", &raw, &document)
        .await
        .expect("ingest fixture plan")
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Returns a fixed response, or a fixed transport failure.
pub struct ScriptedGenerator {
    response: Result<String, String>,
    calls: Mutex<u32>,
}

impl ScriptedGenerator {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PlanGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        *self.calls.lock().unwrap() += 1;
        self.response.clone().map_err(GenerationError::Transport)
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

const PAGE_SIZE: usize = 2;

#[derive(Default)]
struct FakeState {
    calendars: Vec<CalendarSummary>,
    time_zones: HashMap<String, String>,
    /// event id -> (calendar id, event)
    events: HashMap<String, (String, EventRequest)>,
    /// Events whose summary contains one of these fail to create.
    failing: Vec<String>,
    /// Event ids whose deletion fails with a backend error.
    undeletable: Vec<String>,
    calls: u32,
    next_id: u32,
}

/// In-memory calendar provider. Lists calendars two per page.
#[derive(Default)]
pub struct FakeCalendar {
    state: Mutex<FakeState>,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(self, id: &str, summary: &str) -> Self {
        self.state.lock().unwrap().calendars.push(CalendarSummary {
            id: id.to_owned(),
            summary: summary.to_owned(),
        });
        self
    }

    pub fn fail_events_containing(&self, needle: &str) {
        self.state.lock().unwrap().failing.push(needle.to_owned());
    }

    pub fn stop_failing(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    pub fn fail_delete_of(&self, event_id: &str) {
        self.state.lock().unwrap().undeletable.push(event_id.to_owned());
    }

    /// Drop an event behind the engine's back.
    pub fn forget_event(&self, event_id: &str) {
        self.state.lock().unwrap().events.remove(event_id);
    }

    pub fn calls(&self) -> u32 {
        self.state.lock().unwrap().calls
    }

    pub fn calendars(&self) -> Vec<CalendarSummary> {
        self.state.lock().unwrap().calendars.clone()
    }

    pub fn time_zone_of(&self, calendar_id: &str) -> Option<String> {
        self.state.lock().unwrap().time_zones.get(calendar_id).cloned()
    }

    pub fn events(&self) -> Vec<(String, EventRequest)> {
        self.state
            .lock()
            .unwrap()
            .events
            .values()
            .cloned()
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().unwrap().events.len()
    }
}

#[async_trait]
impl CalendarProvider for FakeCalendar {
    fn name(&self) -> &str {
        "fake"
    }

    async fn list_calendars(
        &self,
        _credentials: &Credentials,
        page_token: Option<&str>,
    ) -> Result<CalendarPage, CalendarError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        let offset: usize = page_token.map_or(0, |t| t.parse().unwrap());
        let items: Vec<_> = state.calendars.iter().skip(offset).take(PAGE_SIZE).cloned().collect();
        let next = offset + PAGE_SIZE;
        Ok(CalendarPage {
            items,
            next_page_token: (next < state.calendars.len()).then(|| next.to_string()),
        })
    }

    async fn create_calendar(
        &self,
        _credentials: &Credentials,
        calendar: &NewCalendar,
    ) -> Result<String, CalendarError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.next_id += 1;
        let id = format!("cal-{}", state.next_id);
        state.calendars.push(CalendarSummary {
            id: id.clone(),
            summary: calendar.summary.clone(),
        });
        state.time_zones.insert(id.clone(), calendar.time_zone.clone());
        Ok(id)
    }

    async fn create_event(
        &self,
        _credentials: &Credentials,
        calendar_id: &str,
        event: &EventRequest,
    ) -> Result<String, CalendarError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.failing.iter().any(|n| event.summary.contains(n.as_str())) {
            return Err(CalendarError::Api {
                status: 500,
                message: "backend error".into(),
            });
        }
        state.next_id += 1;
        let id = format!("evt-{}", state.next_id);
        state
            .events
            .insert(id.clone(), (calendar_id.to_owned(), event.clone()));
        Ok(id)
    }

    async fn delete_event(
        &self,
        _credentials: &Credentials,
        _calendar_id: &str,
        event_id: &str,
    ) -> Result<(), CalendarError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.undeletable.iter().any(|id| id == event_id) {
            return Err(CalendarError::Api {
                status: 503,
                message: "backend unavailable".into(),
            });
        }
        match state.events.remove(event_id) {
            Some(_) => Ok(()),
            None => Err(CalendarError::NotFound(event_id.to_owned())),
        }
    }

    async fn delete_calendar(&self, _credentials: &Credentials, calendar_id: &str) -> Result<(), CalendarError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        let before = state.calendars.len();
        state.calendars.retain(|c| c.id != calendar_id);
        if state.calendars.len() == before {
            return Err(CalendarError::NotFound(calendar_id.to_owned()));
        }
        state.events.retain(|_, (cal, _)| cal.as_str() != calendar_id);
        Ok(())
    }
}
