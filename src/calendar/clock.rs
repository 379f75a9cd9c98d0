use serde::{Deserialize, Serialize};
use std::fmt;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// A local wall-clock time of day in `HH:mm` form.
///
/// `24:00` is accepted as the end of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    pub fn parse(raw: &str) -> Option<Self> {
        let (h, m) = raw.trim().split_once(':')?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        let hours: u16 = h.parse().ok()?;
        let minutes: u16 = m.parse().ok()?;
        if minutes > 59 || hours > 24 || (hours == 24 && minutes != 0) {
            return None;
        }
        Some(Self {
            minutes: hours * 60 + minutes,
        })
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.minutes
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

/// Hours between two `HH:mm` strings.
///
/// An end earlier than the start is a shift running past midnight.
pub fn span_hours(start: &str, end: &str) -> Option<f64> {
    let start = ClockTime::parse(start)?;
    let end = ClockTime::parse(end)?;
    let mut diff = i32::from(end.minutes) - i32::from(start.minutes);
    if diff < 0 {
        diff += MINUTES_PER_DAY;
    }
    Some(f64::from(diff) / 60.0)
}

/// Daily working window with an optional break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_end: Option<String>,
}

impl WorkingHours {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            break_start: None,
            break_end: None,
        }
    }

    pub fn with_break(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.break_start = Some(start.into());
        self.break_end = Some(end.into());
        self
    }

    /// Net working hours, or `None` when the window is malformed or empty.
    pub fn hours(&self) -> Option<f64> {
        let gross = span_hours(&self.start, &self.end)?;
        let pause = match (&self.break_start, &self.break_end) {
            (Some(bs), Some(be)) => span_hours(bs, be)?,
            _ => 0.0,
        };
        let net = gross - pause;
        (net > 0.0).then_some(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_clock_times() {
        let t = ClockTime::parse("09:05").unwrap();
        assert_eq!(t.minutes_since_midnight(), 545);
        assert_eq!(t.to_string(), "09:05");
        assert_eq!(ClockTime::parse("24:00").unwrap().minutes_since_midnight(), 1440);
        assert_eq!(ClockTime::parse("7:30").unwrap().to_string(), "07:30");
    }

    #[test]
    fn rejects_malformed_clock_times() {
        for raw in ["", "9", "09:5", "25:00", "24:30", "12:60", "ab:cd", "-1:00"] {
            assert!(ClockTime::parse(raw).is_none(), "{raw} should not parse");
        }
    }

    #[test]
    fn span_wraps_past_midnight() {
        assert_eq!(span_hours("22:00", "06:00"), Some(8.0));
        assert_eq!(span_hours("00:00", "24:00"), Some(24.0));
        assert_eq!(span_hours("09:00", "09:00"), Some(0.0));
    }

    #[test]
    fn break_is_subtracted() {
        let hours = WorkingHours::new("09:00", "18:00").with_break("13:00", "14:00");
        assert_eq!(hours.hours(), Some(8.0));
    }

    #[test]
    fn malformed_or_empty_window_has_no_hours() {
        assert_eq!(WorkingHours::new("nine", "18:00").hours(), None);
        assert_eq!(WorkingHours::new("09:00", "09:00").hours(), None);
        let bad_break = WorkingHours::new("09:00", "18:00").with_break("13:00", "xx");
        assert_eq!(bad_break.hours(), None);
    }
}
