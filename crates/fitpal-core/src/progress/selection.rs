use chrono::{Datelike, Days, NaiveDate};

use crate::error::{FitpalError, Result};

/// Longest span a single progress query may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Which dates a progress query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSelection {
    Single(NaiveDate),
    /// Inclusive on both ends.
    Range { start: NaiveDate, end: NaiveDate },
    /// The month containing `today`, padded out to whole Monday-to-Sunday
    /// weeks.
    #[default]
    CurrentMonth,
}

impl DateSelection {
    /// The inclusive `(first, last)` dates selected, relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        match *self {
            Self::Single(date) => Ok((date, date)),
            Self::Range { start, end } => {
                if end < start {
                    return Err(FitpalError::validation(format!(
                        "end date {end} is before start date {start}"
                    )));
                }
                if (end - start).num_days() >= MAX_RANGE_DAYS {
                    return Err(FitpalError::validation(format!(
                        "date range must not exceed {MAX_RANGE_DAYS} days"
                    )));
                }
                Ok((start, end))
            }
            Self::CurrentMonth => month_weeks(today)
                .ok_or_else(|| FitpalError::validation(format!("month of {today} is out of range"))),
        }
    }
}

/// Monday on or before the 1st of `today`'s month through the Sunday on or
/// after its last day.
fn month_weeks(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = today.with_day(1)?;
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
    };
    let last = next_month.pred_opt()?;

    let start = first.checked_sub_days(Days::new(u64::from(first.weekday().num_days_from_monday())))?;
    let end = last.checked_add_days(Days::new(u64::from(6 - last.weekday().num_days_from_monday())))?;
    Some((start, end))
}

/// Every date from `start` to `end` inclusive.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}
