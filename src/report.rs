use crate::calendar::{WorkCalendar, days_inclusive, short_weekday_name};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One calendar day as seen by a work calendar; rows feed resource histograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub weekday: String,
    pub is_working: bool,
    pub hours: f64,
    pub is_exception: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub calendar_days: usize,
    pub working_days: usize,
    pub working_hours: f64,
}

pub fn calendar_day_report(
    calendar: &WorkCalendar,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DayReport> {
    days_inclusive(start, end)
        .map(|date| DayReport {
            date,
            weekday: short_weekday_name(date.weekday()).to_string(),
            is_working: calendar.is_working_day(date),
            hours: calendar.working_hours(date),
            is_exception: calendar.exception_on(date).is_some(),
        })
        .collect()
}

pub fn summarize_days(rows: &[DayReport]) -> DaySummary {
    DaySummary {
        calendar_days: rows.len(),
        working_days: rows.iter().filter(|row| row.is_working).count(),
        working_hours: rows.iter().map(|row| row.hours).sum(),
    }
}
