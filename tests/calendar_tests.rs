use chrono::{Datelike, NaiveDate, Weekday};
use work_calendar::{
    CalendarCatalog, CalendarException, CyclicPattern, ShiftCycle, TemplateType, WeeklyPattern,
    WorkCalendar, WorkingDayRule, WorkingHours,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn standard() -> WorkCalendar {
    CalendarCatalog::default()
        .create_from_template_type(TemplateType::Standard, None)
        .unwrap()
}

#[test]
fn standard_calendar_weekday_hours() {
    let cal = standard();
    // 2025-01-08 is a Wednesday, 2025-01-04 a Saturday
    assert_eq!(d(2025, 1, 8).weekday(), Weekday::Wed);
    assert!(cal.is_working_day(d(2025, 1, 8)));
    assert_eq!(cal.working_hours(d(2025, 1, 8)), 8.0);
    assert!(!cal.is_working_day(d(2025, 1, 4)));
    assert_eq!(cal.working_hours(d(2025, 1, 4)), 0.0);
}

#[test]
fn night_shift_span_crosses_midnight() {
    let cal = standard().with_weekly_pattern(WeeklyPattern::uniform(
        &[Weekday::Mon],
        &WorkingHours::new("22:00", "06:00"),
    ));
    assert_eq!(cal.working_hours(d(2025, 1, 6)), 8.0);
    assert_eq!(cal.working_hours(d(2025, 1, 7)), 0.0);
}

#[test]
fn working_exception_without_hours_uses_flat_hours() {
    let sat = d(2025, 1, 4);
    let mut cal = standard().with_exception(CalendarException::working(sat));
    assert!(cal.is_working_day(sat));
    assert_eq!(cal.working_hours(sat), 8.0);

    cal.hours_per_day = 6.5;
    assert_eq!(cal.working_hours(sat), 6.5);
}

#[test]
fn exception_hours_override_the_weekday_window() {
    let wed = d(2025, 1, 8);
    let cal = standard().with_exception(CalendarException::working(wed).with_hours("10:00", "14:00"));
    assert_eq!(cal.working_hours(wed), 4.0);
}

#[test]
fn non_working_exception_only_affects_its_day() {
    let wed = d(2025, 1, 8);
    let cal = standard().with_exception(
        CalendarException::non_working(wed).with_description("Site inspection"),
    );
    assert!(!cal.is_working_day(wed));
    assert_eq!(cal.working_hours(wed), 0.0);
    assert!(cal.is_working_day(d(2025, 1, 7)));
    assert!(cal.is_working_day(d(2025, 1, 9)));
    assert!(cal.is_working_day(d(2025, 1, 15)));
}

#[test]
fn malformed_window_falls_back_to_flat_hours() {
    let broken = WeeklyPattern::uniform(&[Weekday::Tue], &WorkingHours::new("9am", "5pm"));
    let cal = standard().with_weekly_pattern(broken);
    assert!(cal.is_working_day(d(2025, 1, 7)));
    assert_eq!(cal.working_hours(d(2025, 1, 7)), 8.0);
}

#[test]
fn with_exception_replaces_same_day_and_refreshes_timestamp() {
    let cal = standard();
    let sat = d(2025, 1, 4);
    let once = cal.with_exception(CalendarException::working(sat));
    let twice = once.with_exception(CalendarException::non_working(sat));
    assert_eq!(twice.exceptions.len(), 1);
    assert!(!twice.is_working_day(sat));
    assert!(twice.updated_at >= cal.updated_at);
    assert_eq!(twice.created_at, cal.created_at);
    assert!(twice.validate().is_ok());
    // the source record is untouched
    assert!(cal.exceptions.is_empty());

    let cleared = twice.without_exception(sat);
    assert!(cleared.exceptions.is_empty());
}

#[test]
fn validate_reports_duplicate_exception_days() {
    let mut cal = standard();
    let sat = d(2025, 1, 4);
    cal.exceptions.push(CalendarException::working(sat));
    cal.exceptions.push(CalendarException::non_working(sat));
    assert!(cal.validate().is_err());
}

#[test]
fn count_working_days_in_range() {
    let cal = standard().with_exception(CalendarException::non_working(d(2025, 1, 1)));
    // Wed 2025-01-01 .. Fri 2025-01-10
    assert_eq!(cal.count_working_days(d(2025, 1, 1), d(2025, 1, 10)), 7);
    assert_eq!(cal.working_hours_between(d(2025, 1, 1), d(2025, 1, 10)), 56.0);
    assert_eq!(cal.count_working_days(d(2025, 1, 10), d(2025, 1, 1)), 0);
}

#[test]
fn rotation_dispatches_on_anchor_distance() {
    let hours = WorkingHours::new("08:00", "20:00");
    let rotation = CyclicPattern::new(d(2025, 1, 6), ShiftCycle::new(2, 2), Some(hours)).unwrap();
    let cal = standard().with_rotation(rotation);

    let worked: Vec<bool> = (6..=13).map(|day| cal.is_working_day(d(2025, 1, day))).collect();
    assert_eq!(worked, vec![true, true, false, false, true, true, false, false]);
    assert_eq!(cal.working_hours(d(2025, 1, 6)), 12.0);
    // Saturday 2025-01-11 is an on-day of the rotation
    assert_eq!(cal.working_hours(d(2025, 1, 11)), 12.0);

    let with_holiday = cal.with_exception(CalendarException::non_working(d(2025, 1, 10)));
    assert!(!with_holiday.is_working_day(d(2025, 1, 10)));
}

#[test]
fn serialized_shape_uses_weekday_indices() {
    let cal = standard().with_exception(CalendarException::non_working(d(2025, 12, 25)));
    let value = serde_json::to_value(&cal).unwrap();

    let days = value["workingDays"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["dayOfWeek"], 0);
    assert_eq!(days[0]["isWorking"], false);
    assert_eq!(days[3]["workingHours"]["breakStart"], "13:00");
    assert_eq!(value["templateType"], "standard");
    assert_eq!(value["exceptions"][0]["type"], "non-working");
    assert_eq!(value["exceptions"][0]["date"], "2025-12-25");

    let back: WorkCalendar = serde_json::from_value(value).unwrap();
    assert_eq!(back, cal);
}

#[test]
fn deserializing_incomplete_week_fails() {
    let cal = standard();
    let mut value = serde_json::to_value(&cal).unwrap();
    value["workingDays"].as_array_mut().unwrap().pop();
    assert!(serde_json::from_value::<WorkCalendar>(value).is_err());
}

#[test]
fn with_rule_edits_a_single_weekday() {
    let pattern = standard()
        .working_days
        .with_rule(WorkingDayRule::working(Weekday::Sat, WorkingHours::new("09:00", "13:00")));
    let cal = standard().with_weekly_pattern(pattern);
    assert_eq!(cal.working_days_per_week, 6);
    assert_eq!(cal.working_hours(d(2025, 1, 4)), 4.0);
}

#[test]
fn renamed_keeps_identity() {
    let cal = standard();
    let renamed = cal.renamed("Head office");
    assert_eq!(renamed.name, "Head office");
    assert_eq!(renamed.id, cal.id);
    assert_eq!(renamed.working_days, cal.working_days);
}

fn with_raw_rotation(on_days: u64, off_days: u64) -> serde_json::Value {
    let mut value = serde_json::to_value(standard()).unwrap();
    value["rotation"] = serde_json::json!({
        "anchor": "2025-01-06",
        "cycle": { "onDays": on_days, "offDays": off_days },
        "workingHours": { "start": "08:00", "end": "20:00" }
    });
    value
}

#[test]
fn imported_rotation_without_on_days_is_rejected() {
    let value = with_raw_rotation(0, 4);
    assert!(serde_json::from_value::<WorkCalendar>(value).is_err());
}

#[test]
fn imported_rotation_with_extreme_lengths_still_answers() {
    let value = with_raw_rotation(u64::from(u32::MAX), 1);
    let cal: WorkCalendar = serde_json::from_value(value).unwrap();
    assert!(cal.is_working_day(d(2025, 1, 6)));
    assert!(cal.is_working_day(d(2030, 1, 6)));
    // One day before the anchor is the single off-day of the cycle.
    assert!(!cal.is_working_day(d(2025, 1, 5)));
    assert_eq!(cal.working_hours(d(2025, 1, 7)), 12.0);
}
