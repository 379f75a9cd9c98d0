pub mod clock;
pub mod pattern;

pub use clock::{ClockTime, WorkingHours, span_hours};
pub use pattern::{
    CyclicPattern, MONDAY_FIRST, SchedulePattern, ShiftCycle, WeeklyPattern, WorkingDayRule,
    short_weekday_name, weekday_from_index, weekday_index,
};

use crate::error::CalendarError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Archetype a calendar was seeded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateType {
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "twenty_four_seven")]
    TwentyFourSeven,
    #[serde(rename = "night_shift")]
    NightShift,
    #[serde(rename = "shift_2_2")]
    TwoOnTwoOff,
    #[serde(rename = "shift_3_1")]
    ThreeOnOneOff,
    #[serde(rename = "shift_4_3")]
    FourOnThreeOff,
    #[serde(rename = "shift_15_15")]
    FifteenOnFifteenOff,
    #[serde(rename = "shift_30_30")]
    ThirtyOnThirtyOff,
    #[serde(rename = "six_day")]
    SixDay,
    #[serde(rename = "custom")]
    Custom,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Standard => "standard",
            TemplateType::TwentyFourSeven => "twenty_four_seven",
            TemplateType::NightShift => "night_shift",
            TemplateType::TwoOnTwoOff => "shift_2_2",
            TemplateType::ThreeOnOneOff => "shift_3_1",
            TemplateType::FourOnThreeOff => "shift_4_3",
            TemplateType::FifteenOnFifteenOff => "shift_15_15",
            TemplateType::ThirtyOnThirtyOff => "shift_30_30",
            TemplateType::SixDay => "six_day",
            TemplateType::Custom => "custom",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "5/2" => Ok(TemplateType::Standard),
            "twenty_four_seven" | "24/7" => Ok(TemplateType::TwentyFourSeven),
            "night_shift" | "night" => Ok(TemplateType::NightShift),
            "shift_2_2" | "2/2" => Ok(TemplateType::TwoOnTwoOff),
            "shift_3_1" | "3/1" => Ok(TemplateType::ThreeOnOneOff),
            "shift_4_3" | "4/3" => Ok(TemplateType::FourOnThreeOff),
            "shift_15_15" | "15/15" => Ok(TemplateType::FifteenOnFifteenOff),
            "shift_30_30" | "30/30" => Ok(TemplateType::ThirtyOnThirtyOff),
            "six_day" | "6/1" => Ok(TemplateType::SixDay),
            "custom" => Ok(TemplateType::Custom),
            other => Err(format!("unknown template type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExceptionKind {
    #[serde(rename = "working")]
    Working,
    #[serde(rename = "non-working")]
    NonWorking,
}

/// A single-day override of the regular pattern (holiday, extra workday).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarException {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: ExceptionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarException {
    pub fn non_working(date: NaiveDate) -> Self {
        Self {
            date,
            kind: ExceptionKind::NonWorking,
            start_time: None,
            end_time: None,
            description: None,
        }
    }

    pub fn working(date: NaiveDate) -> Self {
        Self {
            kind: ExceptionKind::Working,
            ..Self::non_working(date)
        }
    }

    pub fn with_hours(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_working(&self) -> bool {
        self.kind == ExceptionKind::Working
    }

    /// Hours given explicitly by the exception, when both ends parse.
    pub fn hours(&self) -> Option<f64> {
        let start = self.start_time.as_deref()?;
        let end = self.end_time.as_deref()?;
        span_hours(start, end).filter(|h| *h > 0.0)
    }
}

/// A named work calendar: a regular pattern plus dated exceptions.
///
/// Records are treated as immutable values; the `with_*` helpers return an
/// edited copy with `updated_at` refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkCalendar {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub template_type: TemplateType,
    pub working_days: WeeklyPattern,
    #[serde(default)]
    pub exceptions: Vec<CalendarException>,
    pub hours_per_day: f64,
    pub working_days_per_week: u8,
    #[serde(default)]
    pub is_base: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<CyclicPattern>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkCalendar {
    pub fn exception_on(&self, date: NaiveDate) -> Option<&CalendarException> {
        self.exceptions.iter().find(|exc| exc.date == date)
    }

    pub fn pattern(&self) -> SchedulePattern<'_> {
        match &self.rotation {
            Some(cyclic) => SchedulePattern::Cyclic(cyclic),
            None => SchedulePattern::Weekly(&self.working_days),
        }
    }

    /// An exception on `date` decides; otherwise the regular pattern does.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        match self.exception_on(date) {
            Some(exc) => exc.is_working(),
            None => self.pattern().is_working(date),
        }
    }

    /// Working hours on `date`.
    ///
    /// Resolution order: exception hours, then the pattern's window for the
    /// day (minus its break), then the flat `hours_per_day`.
    pub fn working_hours(&self, date: NaiveDate) -> f64 {
        if !self.is_working_day(date) {
            return 0.0;
        }
        if let Some(hours) = self.exception_on(date).and_then(CalendarException::hours) {
            return hours;
        }
        if let Some(hours) = self
            .pattern()
            .hours_for(date)
            .and_then(WorkingHours::hours)
        {
            return hours;
        }
        debug!(
            calendar = %self.id,
            %date,
            hours_per_day = self.hours_per_day,
            "no usable working window, using flat hours per day"
        );
        self.hours_per_day
    }

    /// Sum of [`working_hours`](Self::working_hours) over `start..=end`.
    pub fn working_hours_between(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        days_inclusive(start, end)
            .map(|date| self.working_hours(date))
            .sum()
    }

    /// Working days in `start..=end`.
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        days_inclusive(start, end)
            .filter(|date| self.is_working_day(*date))
            .count() as i64
    }

    pub fn validate(&self) -> Result<(), CalendarError> {
        let mut seen = HashSet::with_capacity(self.exceptions.len());
        for exc in &self.exceptions {
            if !seen.insert(exc.date) {
                return Err(CalendarError::DuplicateException {
                    calendar_id: self.id.clone(),
                    date: exc.date,
                });
            }
        }
        Ok(())
    }

    /// Copy with `exception` added, replacing any exception on the same day.
    pub fn with_exception(&self, exception: CalendarException) -> Self {
        let mut next = self.clone();
        next.exceptions.retain(|exc| exc.date != exception.date);
        next.exceptions.push(exception);
        next.exceptions.sort_by_key(|exc| exc.date);
        next.touch()
    }

    pub fn without_exception(&self, date: NaiveDate) -> Self {
        let mut next = self.clone();
        next.exceptions.retain(|exc| exc.date != date);
        next.touch()
    }

    /// Copy with a new weekly pattern; `working_days_per_week` follows it.
    pub fn with_weekly_pattern(&self, pattern: WeeklyPattern) -> Self {
        let mut next = self.clone();
        next.working_days_per_week = pattern.working_day_count();
        next.working_days = pattern;
        next.touch()
    }

    /// Copy following `rotation` instead of the weekly pattern.
    pub fn with_rotation(&self, rotation: CyclicPattern) -> Self {
        let mut next = self.clone();
        next.rotation = Some(rotation);
        next.touch()
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.name = name.into();
        next.touch()
    }

    fn touch(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }
}

/// Every calendar day from `start` through `end`; empty when `end < start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let len = (end.signed_duration_since(start).num_days() + 1).max(0);
    (0..len).map(move |offset| start + Duration::days(offset))
}
