use crate::calendar::{CalendarError, DATE_FORMAT, StudyCalendar};
use crate::engine::{MAX_CALENDAR_DAYS, REVIEW_OFFSETS};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PERIOD: u32 = 30;
pub const DEFAULT_DAILY_NEW_CAP: u32 = 5;
pub const DEFAULT_DAILY_REVIEW_CAP: u32 = 10;

// Furthest a due date can land past the last processed day: the largest
// offset plus a weekend roll-forward.
const HORIZON_SLACK_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    InvalidDate(CalendarError),
    HorizonOverflow { start_date: NaiveDate },
    Negative { field: &'static str, value: i64 },
    OutOfRange { field: &'static str, value: i64 },
    Unparseable { field: &'static str, value: String },
    UnknownField(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidDate(err) => write!(f, "{err}"),
            SettingsError::HorizonOverflow { start_date } => write!(
                f,
                "start date {start_date} leaves no room for a full scheduling horizon"
            ),
            SettingsError::Negative { field, value } => {
                write!(f, "{field} must be zero or greater (got {value})")
            }
            SettingsError::OutOfRange { field, value } => {
                write!(f, "{field} is out of range (got {value})")
            }
            SettingsError::Unparseable { field, value } => {
                write!(f, "cannot read '{value}' as {field}")
            }
            SettingsError::UnknownField(field) => write!(f, "unknown settings field '{field}'"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<CalendarError> for SettingsError {
    fn from(value: CalendarError) -> Self {
        Self::InvalidDate(value)
    }
}

impl SettingsError {
    pub fn is_date_error(&self) -> bool {
        matches!(
            self,
            SettingsError::InvalidDate(_) | SettingsError::HorizonOverflow { .. }
        )
    }
}

/// Everything the scheduler is configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Intended study period in days. Advisory only: scheduling runs until
    /// the review backlog is exhausted.
    pub period: u32,
    pub daily_new_cap: u32,
    pub daily_review_cap: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub skip_excluded_days: bool,
}

impl Settings {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            period: DEFAULT_PERIOD,
            daily_new_cap: DEFAULT_DAILY_NEW_CAP,
            daily_review_cap: DEFAULT_DAILY_REVIEW_CAP,
            start_date,
            skip_excluded_days: false,
        }
    }

    pub fn with_caps(mut self, daily_new_cap: u32, daily_review_cap: u32) -> Self {
        self.daily_new_cap = daily_new_cap;
        self.daily_review_cap = daily_review_cap;
        self
    }

    pub fn skipping_excluded_days(mut self, skip: bool) -> Self {
        self.skip_excluded_days = skip;
        self
    }

    pub fn calendar(&self) -> StudyCalendar {
        StudyCalendar::new(self.skip_excluded_days)
    }

    /// Check that the whole scheduling horizon starting at `start_date` is
    /// representable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let longest_offset = REVIEW_OFFSETS.iter().copied().max().unwrap_or(0) as u64;
        let horizon = u64::from(MAX_CALENDAR_DAYS) + longest_offset + HORIZON_SLACK_DAYS;
        self.start_date
            .checked_add_days(Days::new(horizon))
            .map(|_| ())
            .ok_or(SettingsError::HorizonOverflow {
                start_date: self.start_date,
            })
    }

    /// Update one field from its textual form, as typed at a prompt.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), SettingsError> {
        let mut input = SettingsInput::from(&*self);
        match field {
            "period" => input.period = parse_integer("period", value)?,
            "new" | "daily_new_cap" => {
                input.daily_new_cap = parse_integer("daily_new_cap", value)?
            }
            "review" | "daily_review_cap" => {
                input.daily_review_cap = parse_integer("daily_review_cap", value)?
            }
            "start" | "start_date" => input.start_date = value.to_string(),
            "skip" | "skip_excluded_days" => {
                input.skip_excluded_days = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => {
                        return Err(SettingsError::Unparseable {
                            field: "skip_excluded_days",
                            value: value.to_string(),
                        });
                    }
                }
            }
            other => return Err(SettingsError::UnknownField(other.to_string())),
        }
        *self = Settings::try_from(input)?;
        Ok(())
    }
}

fn parse_integer(field: &'static str, value: &str) -> Result<i64, SettingsError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| SettingsError::Unparseable {
            field,
            value: value.to_string(),
        })
}

/// Unvalidated settings as they arrive from JSON, a prompt or an HTTP body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsInput {
    #[serde(default = "default_period")]
    pub period: i64,
    pub daily_new_cap: i64,
    pub daily_review_cap: i64,
    pub start_date: String,
    #[serde(default)]
    pub skip_excluded_days: bool,
}

fn default_period() -> i64 {
    i64::from(DEFAULT_PERIOD)
}

fn non_negative_u32(field: &'static str, value: i64) -> Result<u32, SettingsError> {
    if value < 0 {
        return Err(SettingsError::Negative { field, value });
    }
    u32::try_from(value).map_err(|_| SettingsError::OutOfRange { field, value })
}

impl TryFrom<SettingsInput> for Settings {
    type Error = SettingsError;

    fn try_from(input: SettingsInput) -> Result<Self, Self::Error> {
        let start_date = StudyCalendar::parse_date(&input.start_date)?;
        let settings = Settings {
            period: non_negative_u32("period", input.period)?,
            daily_new_cap: non_negative_u32("daily_new_cap", input.daily_new_cap)?,
            daily_review_cap: non_negative_u32("daily_review_cap", input.daily_review_cap)?,
            start_date,
            skip_excluded_days: input.skip_excluded_days,
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl From<&Settings> for SettingsInput {
    fn from(settings: &Settings) -> Self {
        Self {
            period: i64::from(settings.period),
            daily_new_cap: i64::from(settings.daily_new_cap),
            daily_review_cap: i64::from(settings.daily_review_cap),
            start_date: settings.start_date.format(DATE_FORMAT).to_string(),
            skip_excluded_days: settings.skip_excluded_days,
        }
    }
}
