//! Calendar synchronization: push plan workouts and meals to an external
//! calendar as events, and take them down again.

pub mod events;
pub mod google;
pub mod provider;
pub mod sync;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use google::GoogleCalendarClient;
pub use provider::{
    CalendarError, CalendarPage, CalendarProvider, CalendarSummary, Credentials, EventRequest,
    NewCalendar, Reminder, ReminderMethod,
};
pub use sync::CalendarSync;

/// Summary of the dedicated calendar events are written to.
pub const DEFAULT_CALENDAR_NAME: &str = "FitPal";

/// Which part of a plan a sync or unsync pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncScope {
    Workout,
    Nutrition,
    #[default]
    All,
}

impl SyncScope {
    pub fn includes_workout(self) -> bool {
        matches!(self, Self::Workout | Self::All)
    }

    pub fn includes_nutrition(self) -> bool {
        matches!(self, Self::Nutrition | Self::All)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workout => "workout",
            Self::Nutrition => "nutrition",
            Self::All => "all",
        }
    }
}

impl fmt::Display for SyncScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workout" => Ok(Self::Workout),
            "nutrition" => Ok(Self::Nutrition),
            "all" => Ok(Self::All),
            other => Err(format!(
                "invalid scope {other:?}, expected workout, nutrition or all"
            )),
        }
    }
}

/// Per-event counts of one sync or unsync call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncOutcome {
    pub success_count: u32,
    pub failure_count: u32,
}

impl SyncOutcome {
    pub(crate) fn record(&mut self, ok: bool) {
        if ok {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
    }
}

impl std::ops::AddAssign for SyncOutcome {
    fn add_assign(&mut self, other: Self) {
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
    }
}
