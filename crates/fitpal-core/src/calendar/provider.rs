//! The `CalendarProvider` trait and the types crossing it.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OAuth credentials of the calendar owner, passed on every call.
#[derive(Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarSummary {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

/// One page of the owner's calendar list.
#[derive(Debug, Clone, Default)]
pub struct CalendarPage {
    pub items: Vec<CalendarSummary>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCalendar {
    pub summary: String,
    pub description: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Popup,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes: i32,
}

/// A timed event in wall-clock time of `time_zone`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRequest {
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time_zone: String,
    /// Explicit reminder list; provider defaults are never used.
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Error)]
pub enum CalendarError {
    /// The calendar or event does not exist (or no longer does).
    #[error("calendar resource not found: {0}")]
    NotFound(String),

    #[error("calendar credentials rejected: {0}")]
    Unauthorized(String),

    #[error("calendar API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("calendar request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    fn name(&self) -> &str;

    /// One page of calendars; pass the previous page's token to continue.
    async fn list_calendars(
        &self,
        credentials: &Credentials,
        page_token: Option<&str>,
    ) -> Result<CalendarPage, CalendarError>;

    /// Returns the new calendar's id.
    async fn create_calendar(
        &self,
        credentials: &Credentials,
        calendar: &NewCalendar,
    ) -> Result<String, CalendarError>;

    /// Returns the new event's id.
    async fn create_event(
        &self,
        credentials: &Credentials,
        calendar_id: &str,
        event: &EventRequest,
    ) -> Result<String, CalendarError>;

    async fn delete_event(
        &self,
        credentials: &Credentials,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), CalendarError>;

    async fn delete_calendar(&self, credentials: &Credentials, calendar_id: &str) -> Result<(), CalendarError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn CalendarProvider) {}
};
