use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Raised when a date input cannot be turned into a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDateError {
    #[error("unparseable date input '{0}'")]
    Unparseable(String),
    #[error("epoch milliseconds {0} are out of range")]
    OutOfRange(i64),
    #[error("local time {0} does not exist in the configured timezone")]
    NonexistentLocalTime(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("weekly pattern must contain exactly one rule per weekday (got {0} rules)")]
    RuleCount(usize),
    #[error("weekly pattern has more than one rule for weekday {0}")]
    DuplicateWeekday(u8),
    #[error("weekly pattern has no rule for weekday {0}")]
    MissingWeekday(u8),
    #[error("calendar '{calendar_id}' has more than one exception on {date}")]
    DuplicateException {
        calendar_id: String,
        date: NaiveDate,
    },
    #[error("rotation needs at least one working day (got {on_days} on / {off_days} off)")]
    EmptyRotation { on_days: u32, off_days: u32 },
    #[error("calendar '{0}' is not a rotating calendar")]
    NotRotating(String),
}

#[derive(Debug, Error)]
pub enum ImportExportError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid date on task '{task_id}': {source}")]
    TaskDate {
        task_id: String,
        #[source]
        source: InvalidDateError,
    },
    #[error("invalid calendar: {0}")]
    Calendar(#[from] CalendarError),
}
