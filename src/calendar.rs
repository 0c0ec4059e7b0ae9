use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    InvalidDate { input: String },
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::InvalidDate { input } => {
                write!(f, "invalid date '{input}' (expected YYYY-MM-DD)")
            }
        }
    }
}

impl std::error::Error for CalendarError {}

/// Calendar used to step through study days.
///
/// Saturday and Sunday are the weekly rest days. When `skip_rest_days` is on,
/// rest days are excluded from the study calendar and every date that would
/// land on one is pushed forward, never backward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyCalendar {
    rest_days: HashSet<Weekday>,
    skip_rest_days: bool,
}

impl Default for StudyCalendar {
    fn default() -> Self {
        Self::new(false)
    }
}

impl StudyCalendar {
    pub const REST_DAYS: [Weekday; 2] = [Weekday::Sat, Weekday::Sun];

    pub fn new(skip_rest_days: bool) -> Self {
        Self {
            rest_days: HashSet::from(Self::REST_DAYS),
            skip_rest_days,
        }
    }

    pub fn skips_rest_days(&self) -> bool {
        self.skip_rest_days
    }

    /// Parse a `YYYY-MM-DD` date string.
    pub fn parse_date(input: &str) -> Result<NaiveDate, CalendarError> {
        NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
            CalendarError::InvalidDate {
                input: input.to_string(),
            }
        })
    }

    pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
        date + Duration::days(days)
    }

    /// Signed number of days from `from` to `to`.
    pub fn day_count(from: NaiveDate, to: NaiveDate) -> i64 {
        (to - from).num_days()
    }

    /// True iff the date falls on one of the weekly rest days, regardless of
    /// whether rest days are being skipped.
    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.rest_days.contains(&date.weekday())
    }

    /// False only for rest days while they are being skipped.
    pub fn is_eligible(&self, date: NaiveDate) -> bool {
        !(self.skip_rest_days && self.is_excluded(date))
    }

    /// The first eligible date on or after `date`.
    pub fn roll_forward(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        while !self.is_eligible(current) {
            current = current + Duration::days(1);
        }
        current
    }

    /// The first eligible date strictly after `from`. With rest days not
    /// skipped this is always the following day.
    pub fn next_eligible(&self, from: NaiveDate) -> NaiveDate {
        self.roll_forward(from + Duration::days(1))
    }

    /// Offset a date and push the result past any excluded day.
    pub fn due_date(&self, from: NaiveDate, offset_days: i64) -> NaiveDate {
        self.roll_forward(Self::add_days(from, offset_days))
    }

    /// Study days from `first` to `last`, both ends included. Zero when
    /// `last` precedes `first`.
    pub fn eligible_days_between(&self, first: NaiveDate, last: NaiveDate) -> i64 {
        first
            .iter_days()
            .take_while(|day| *day <= last)
            .filter(|day| self.is_eligible(*day))
            .count() as i64
    }
}
