//! Calendar-day normalization.
//!
//! Every other part of the crate reasons in terms of local calendar days
//! (`NaiveDate`). This module is the only place where instants, ISO strings
//! and epoch milliseconds are turned into those days, always by reading the
//! wall-clock components in the configured zone rather than doing arithmetic
//! on UTC instants.

use crate::error::InvalidDateError;
use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use tracing::trace;

pub type DateResult<T> = Result<T, InvalidDateError>;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Steps tried when a wall-clock time falls into a DST gap.
const GAP_PROBE_STEP_MINUTES: i64 = 15;
const GAP_PROBE_LIMIT: usize = 12;

/// Anything the normalizer accepts as a date.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    /// An instant with a known offset.
    Instant(DateTime<FixedOffset>),
    /// A wall-clock time already expressed in the normalizer's zone.
    Naive(NaiveDateTime),
    Day(NaiveDate),
    Iso(String),
    EpochMillis(i64),
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(value: DateTime<Tz>) -> Self {
        DateInput::Instant(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        DateInput::Naive(value)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::Day(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Iso(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Iso(value)
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        DateInput::EpochMillis(value)
    }
}

enum ParsedIso {
    Instant(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
    Day(NaiveDate),
}

fn parse_iso(raw: &str) -> DateResult<ParsedIso> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(InvalidDateError::Unparseable(raw.to_string()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(ParsedIso::Instant(dt));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ParsedIso::Naive(naive));
        }
    }
    // Date-only strings name a calendar day, not UTC midnight.
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(ParsedIso::Day)
        .map_err(|_| InvalidDateError::Unparseable(raw.to_string()))
}

fn from_epoch_millis(ms: i64) -> DateResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or(InvalidDateError::OutOfRange(ms))
}

/// Converts date inputs into calendar days of a single timezone.
#[derive(Debug, Clone)]
pub struct DateNormalizer<Tz: TimeZone = Local> {
    tz: Tz,
}

impl DateNormalizer<Local> {
    /// Normalizer bound to the zone of the running process.
    pub fn local() -> Self {
        Self { tz: Local }
    }
}

impl Default for DateNormalizer<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone> DateNormalizer<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    fn wall_clock(&self, input: DateInput) -> DateResult<NaiveDateTime> {
        let naive = match input {
            DateInput::Instant(dt) => dt.with_timezone(&self.tz).naive_local(),
            DateInput::Naive(naive) => naive,
            DateInput::Day(day) => day.and_time(NaiveTime::MIN),
            DateInput::EpochMillis(ms) => from_epoch_millis(ms)?
                .with_timezone(&self.tz)
                .naive_local(),
            DateInput::Iso(raw) => match parse_iso(&raw)? {
                ParsedIso::Instant(dt) => dt.with_timezone(&self.tz).naive_local(),
                ParsedIso::Naive(naive) => naive,
                ParsedIso::Day(day) => day.and_time(NaiveTime::MIN),
            },
        };
        Ok(naive)
    }

    /// The local calendar day an input falls on.
    pub fn calendar_day(&self, input: impl Into<DateInput>) -> DateResult<NaiveDate> {
        Ok(self.wall_clock(input.into())?.date())
    }

    /// `00:00:00.000` of the input's local calendar day.
    ///
    /// An input at `23:59:59.999` stays on its own day.
    pub fn to_local_midnight(&self, input: impl Into<DateInput>) -> DateResult<DateTime<Tz>> {
        let day = self.calendar_day(input)?;
        self.start_of_day(day)
    }

    /// `23:59:59.999` of the input's local calendar day.
    pub fn to_local_end_of_day(&self, input: impl Into<DateInput>) -> DateResult<DateTime<Tz>> {
        let day = self.calendar_day(input)?;
        self.end_of_day(day)
    }

    /// Whole calendar days from `start` to `end`.
    ///
    /// Both sides are reduced to calendar days first, so neither time of day
    /// nor a DST transition inside the range affects the count.
    pub fn calendar_days_diff(
        &self,
        start: impl Into<DateInput>,
        end: impl Into<DateInput>,
    ) -> DateResult<i64> {
        let start = self.calendar_day(start)?;
        let end = self.calendar_day(end)?;
        Ok(end.signed_duration_since(start).num_days())
    }

    pub fn is_today(&self, input: impl Into<DateInput>) -> DateResult<bool> {
        self.is_today_at(input, Utc::now())
    }

    /// Same as [`is_today`](Self::is_today) against a caller-supplied clock.
    pub fn is_today_at(&self, input: impl Into<DateInput>, now: DateTime<Utc>) -> DateResult<bool> {
        let day = self.calendar_day(input)?;
        Ok(day == now.with_timezone(&self.tz).date_naive())
    }

    /// Calendar day of a task end emitted by the scheduling backend.
    ///
    /// The backend writes the end as `23:59:59.999` of the last occupied day.
    /// UTC timestamps (`Z` or `+00:00`) and epoch milliseconds are read in
    /// this zone, like [`calendar_day`](Self::calendar_day). A timestamp with
    /// an explicit non-zero offset keeps the wall-clock date written in that
    /// offset.
    pub fn backend_end_day(&self, input: impl Into<DateInput>) -> DateResult<NaiveDate> {
        let input = input.into();
        let day = match &input {
            DateInput::Instant(dt) => self.offset_instant_day(dt),
            DateInput::Iso(raw) => match parse_iso(raw)? {
                ParsedIso::Instant(dt) => self.offset_instant_day(&dt),
                ParsedIso::Naive(naive) => naive.date(),
                ParsedIso::Day(day) => day,
            },
            _ => self.wall_clock(input.clone())?.date(),
        };
        trace!(?input, %day, "normalized backend end date");
        Ok(day)
    }

    fn offset_instant_day(&self, dt: &DateTime<FixedOffset>) -> NaiveDate {
        if dt.offset().local_minus_utc() == 0 {
            dt.with_timezone(&self.tz).date_naive()
        } else {
            dt.date_naive()
        }
    }

    /// Local midnight of the backend end's calendar day.
    pub fn normalize_backend_end_date(
        &self,
        input: impl Into<DateInput>,
    ) -> DateResult<DateTime<Tz>> {
        let day = self.backend_end_day(input)?;
        self.start_of_day(day)
    }

    /// First existing instant of `day` in this zone.
    pub fn start_of_day(&self, day: NaiveDate) -> DateResult<DateTime<Tz>> {
        self.resolve(day.and_time(NaiveTime::MIN), GAP_PROBE_STEP_MINUTES)
    }

    /// Last millisecond of `day` in this zone.
    pub fn end_of_day(&self, day: NaiveDate) -> DateResult<DateTime<Tz>> {
        let naive = day
            .and_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| InvalidDateError::Unparseable(day.to_string()))?;
        self.resolve(naive, -GAP_PROBE_STEP_MINUTES)
    }

    fn resolve(&self, naive: NaiveDateTime, step_minutes: i64) -> DateResult<DateTime<Tz>> {
        let mapped = self.tz.from_local_datetime(&naive);
        let direct = if step_minutes >= 0 {
            mapped.earliest()
        } else {
            mapped.latest()
        };
        if let Some(dt) = direct {
            return Ok(dt);
        }
        // DST gap: walk toward the inside of the same day.
        let mut probe = naive;
        for _ in 0..GAP_PROBE_LIMIT {
            probe += Duration::minutes(step_minutes);
            if probe.date() != naive.date() {
                break;
            }
            if let Some(dt) = self.tz.from_local_datetime(&probe).earliest() {
                return Ok(dt);
            }
        }
        Err(InvalidDateError::NonexistentLocalTime(naive))
    }
}
