use super::clock::WorkingHours;
use crate::error::CalendarError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Weekdays in display order.
pub const MONDAY_FIRST: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Index used on the wire: 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn short_weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

mod weekday_as_index {
    use super::{weekday_from_index, weekday_index};
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(weekday_index(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let index = u8::deserialize(deserializer)?;
        weekday_from_index(index)
            .ok_or_else(|| D::Error::custom(format!("weekday index {index} is outside 0..=6")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingDayRule {
    #[serde(with = "weekday_as_index")]
    pub day_of_week: Weekday,
    pub is_working: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<WorkingHours>,
}

impl WorkingDayRule {
    pub fn working(day_of_week: Weekday, hours: WorkingHours) -> Self {
        Self {
            day_of_week,
            is_working: true,
            working_hours: Some(hours),
        }
    }

    pub fn day_off(day_of_week: Weekday) -> Self {
        Self {
            day_of_week,
            is_working: false,
            working_hours: None,
        }
    }
}

/// One rule per weekday, indexed Sunday = 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WorkingDayRule>", into = "Vec<WorkingDayRule>")]
pub struct WeeklyPattern {
    rules: [WorkingDayRule; 7],
}

impl WeeklyPattern {
    pub fn from_fn(mut rule_for: impl FnMut(Weekday) -> WorkingDayRule) -> Self {
        let rules = std::array::from_fn(|idx| {
            let day = weekday_from_index(idx as u8).unwrap_or(Weekday::Sun);
            let mut rule = rule_for(day);
            rule.day_of_week = day;
            rule
        });
        Self { rules }
    }

    /// Working days share `hours`; every other weekday is off.
    pub fn uniform(working: &[Weekday], hours: &WorkingHours) -> Self {
        Self::from_fn(|day| {
            if working.contains(&day) {
                WorkingDayRule::working(day, hours.clone())
            } else {
                WorkingDayRule::day_off(day)
            }
        })
    }

    pub fn rule(&self, day: Weekday) -> &WorkingDayRule {
        &self.rules[usize::from(weekday_index(day))]
    }

    /// Rules in Sunday-first wire order.
    pub fn rules(&self) -> &[WorkingDayRule; 7] {
        &self.rules
    }

    pub fn is_working(&self, day: Weekday) -> bool {
        self.rule(day).is_working
    }

    pub fn working_weekdays(&self) -> Vec<Weekday> {
        MONDAY_FIRST
            .into_iter()
            .filter(|day| self.is_working(*day))
            .collect()
    }

    pub fn non_working_weekdays(&self) -> Vec<Weekday> {
        MONDAY_FIRST
            .into_iter()
            .filter(|day| !self.is_working(*day))
            .collect()
    }

    pub fn working_day_count(&self) -> u8 {
        self.rules.iter().filter(|rule| rule.is_working).count() as u8
    }

    pub fn with_rule(mut self, rule: WorkingDayRule) -> Self {
        let idx = usize::from(weekday_index(rule.day_of_week));
        self.rules[idx] = rule;
        self
    }
}

impl TryFrom<Vec<WorkingDayRule>> for WeeklyPattern {
    type Error = CalendarError;

    fn try_from(value: Vec<WorkingDayRule>) -> Result<Self, Self::Error> {
        if value.len() != 7 {
            return Err(CalendarError::RuleCount(value.len()));
        }
        let mut slots: [Option<WorkingDayRule>; 7] = Default::default();
        for rule in value {
            let idx = usize::from(weekday_index(rule.day_of_week));
            if slots[idx].is_some() {
                return Err(CalendarError::DuplicateWeekday(idx as u8));
            }
            slots[idx] = Some(rule);
        }
        let mut rules = Vec::with_capacity(7);
        for (idx, slot) in slots.into_iter().enumerate() {
            rules.push(slot.ok_or(CalendarError::MissingWeekday(idx as u8))?);
        }
        let rules: [WorkingDayRule; 7] = rules
            .try_into()
            .map_err(|rules: Vec<WorkingDayRule>| CalendarError::RuleCount(rules.len()))?;
        Ok(Self { rules })
    }
}

impl From<WeeklyPattern> for Vec<WorkingDayRule> {
    fn from(value: WeeklyPattern) -> Self {
        value.rules.into()
    }
}

/// Rotation length of a shift archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftCycle {
    pub on_days: u32,
    pub off_days: u32,
}

impl ShiftCycle {
    pub const fn new(on_days: u32, off_days: u32) -> Self {
        Self { on_days, off_days }
    }

    pub fn length(self) -> u64 {
        u64::from(self.on_days) + u64::from(self.off_days)
    }

    /// Whether day `offset` of the rotation (0 = first on-day) is worked.
    pub fn is_on(self, offset: i64) -> bool {
        // Two u32 halves always fit in i64.
        let len = i64::try_from(self.length().max(1)).unwrap_or(i64::MAX);
        offset.rem_euclid(len) < i64::from(self.on_days)
    }

    /// The rotation laid over a single week starting on Monday.
    pub fn weekly_projection(self, hours: &WorkingHours) -> WeeklyPattern {
        let working: Vec<Weekday> = MONDAY_FIRST
            .into_iter()
            .enumerate()
            .filter(|(offset, _)| self.is_on(*offset as i64))
            .map(|(_, day)| day)
            .collect();
        WeeklyPattern::uniform(&working, hours)
    }
}

/// A rotation pinned to a concrete first on-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CyclicPatternRecord")]
pub struct CyclicPattern {
    pub anchor: NaiveDate,
    pub cycle: ShiftCycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<WorkingHours>,
}

/// Wire form of [`CyclicPattern`], checked by [`CyclicPattern::new`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CyclicPatternRecord {
    anchor: NaiveDate,
    cycle: ShiftCycle,
    #[serde(default)]
    working_hours: Option<WorkingHours>,
}

impl TryFrom<CyclicPatternRecord> for CyclicPattern {
    type Error = CalendarError;

    fn try_from(record: CyclicPatternRecord) -> Result<Self, Self::Error> {
        Self::new(record.anchor, record.cycle, record.working_hours)
    }
}

impl CyclicPattern {
    pub fn new(
        anchor: NaiveDate,
        cycle: ShiftCycle,
        working_hours: Option<WorkingHours>,
    ) -> Result<Self, CalendarError> {
        if cycle.on_days == 0 {
            return Err(CalendarError::EmptyRotation {
                on_days: cycle.on_days,
                off_days: cycle.off_days,
            });
        }
        Ok(Self {
            anchor,
            cycle,
            working_hours,
        })
    }

    pub fn is_working(&self, date: NaiveDate) -> bool {
        self.cycle
            .is_on(date.signed_duration_since(self.anchor).num_days())
    }
}

/// How a calendar decides which days are worked, before exceptions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulePattern<'a> {
    Weekly(&'a WeeklyPattern),
    Cyclic(&'a CyclicPattern),
}

impl<'a> SchedulePattern<'a> {
    pub fn is_working(&self, date: NaiveDate) -> bool {
        match *self {
            SchedulePattern::Weekly(pattern) => pattern.is_working(date.weekday()),
            SchedulePattern::Cyclic(pattern) => pattern.is_working(date),
        }
    }

    /// Working window the pattern assigns to `date`, if it names one.
    pub fn hours_for(&self, date: NaiveDate) -> Option<&'a WorkingHours> {
        match *self {
            SchedulePattern::Weekly(pattern) => pattern.rule(date.weekday()).working_hours.as_ref(),
            SchedulePattern::Cyclic(pattern) => pattern.working_hours.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nine_to_five() -> WorkingHours {
        WorkingHours::new("09:00", "17:00")
    }

    #[test]
    fn from_fn_forces_matching_weekday() {
        let pattern = WeeklyPattern::from_fn(|_| WorkingDayRule::day_off(Weekday::Mon));
        for (idx, rule) in pattern.rules().iter().enumerate() {
            assert_eq!(weekday_index(rule.day_of_week) as usize, idx);
        }
    }

    #[test]
    fn rejects_incomplete_or_duplicated_rule_lists() {
        let six: Vec<WorkingDayRule> = MONDAY_FIRST[..6]
            .iter()
            .map(|d| WorkingDayRule::day_off(*d))
            .collect();
        assert_eq!(
            WeeklyPattern::try_from(six.clone()),
            Err(CalendarError::RuleCount(6))
        );

        let mut dup = six;
        dup.push(WorkingDayRule::day_off(Weekday::Mon));
        assert_eq!(
            WeeklyPattern::try_from(dup),
            Err(CalendarError::DuplicateWeekday(1))
        );
    }

    #[test]
    fn rule_lists_in_any_order_are_accepted() {
        let rules: Vec<WorkingDayRule> = MONDAY_FIRST
            .iter()
            .rev()
            .map(|d| WorkingDayRule::working(*d, nine_to_five()))
            .collect();
        let pattern = WeeklyPattern::try_from(rules).unwrap();
        assert_eq!(pattern.rules()[0].day_of_week, Weekday::Sun);
        assert_eq!(pattern.working_day_count(), 7);
    }

    #[test]
    fn projection_of_two_on_two_off() {
        let pattern = ShiftCycle::new(2, 2).weekly_projection(&nine_to_five());
        assert_eq!(
            pattern.working_weekdays(),
            vec![Weekday::Mon, Weekday::Tue, Weekday::Fri, Weekday::Sat]
        );
    }

    #[test]
    fn cyclic_pattern_counts_from_anchor_in_both_directions() {
        let anchor = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let cyc = CyclicPattern::new(anchor, ShiftCycle::new(2, 2), None).unwrap();
        let day = |n: i64| anchor + chrono::Duration::days(n);
        assert!(cyc.is_working(day(0)));
        assert!(cyc.is_working(day(1)));
        assert!(!cyc.is_working(day(2)));
        assert!(!cyc.is_working(day(3)));
        assert!(cyc.is_working(day(4)));
        assert!(!cyc.is_working(day(-1)));
        assert!(cyc.is_working(day(-3)));
    }

    #[test]
    fn huge_cycles_do_not_overflow() {
        let cycle = ShiftCycle::new(u32::MAX, u32::MAX);
        assert_eq!(cycle.length(), 2 * u64::from(u32::MAX));
        assert!(cycle.is_on(0));
        assert!(cycle.is_on(-1 - i64::from(u32::MAX)));
        assert!(!cycle.is_on(-1));
    }

    #[test]
    fn deserializing_goes_through_validation() {
        let empty = r#"{"anchor":"2025-01-01","cycle":{"onDays":0,"offDays":3}}"#;
        assert!(serde_json::from_str::<CyclicPattern>(empty).is_err());

        let ok = r#"{"anchor":"2025-01-01","cycle":{"onDays":2,"offDays":2}}"#;
        let pattern: CyclicPattern = serde_json::from_str(ok).unwrap();
        assert_eq!(pattern.cycle, ShiftCycle::new(2, 2));
        assert!(pattern.working_hours.is_none());
    }

    #[test]
    fn rotation_without_on_days_is_rejected() {
        let anchor = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(CyclicPattern::new(anchor, ShiftCycle::new(0, 3), None).is_err());
    }
}
