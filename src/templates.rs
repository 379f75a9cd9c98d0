//! Built-in calendar archetypes.

use crate::calendar::{ShiftCycle, TemplateType, WeeklyPattern, WorkingHours};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// An immutable archetype used to seed new calendars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarTemplate {
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub hours_per_day: f64,
    pub working_days_per_week: u8,
    pub working_days: WeeklyPattern,
    pub default_work_time: WorkingHours,
    /// Rotation of shift archetypes; `working_days` then holds its
    /// Monday-anchored weekly projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<ShiftCycle>,
}

const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

fn weekly(
    template_type: TemplateType,
    name: &str,
    description: &str,
    short_description: &str,
    hours_per_day: f64,
    working: &[Weekday],
    work_time: WorkingHours,
) -> CalendarTemplate {
    let working_days = WeeklyPattern::uniform(working, &work_time);
    CalendarTemplate {
        template_type,
        name: name.to_string(),
        description: description.to_string(),
        short_description: short_description.to_string(),
        hours_per_day,
        working_days_per_week: working_days.working_day_count(),
        working_days,
        default_work_time: work_time,
        cycle: None,
    }
}

fn rotating(
    template_type: TemplateType,
    name: &str,
    description: &str,
    short_description: &str,
    hours_per_day: f64,
    cycle: ShiftCycle,
    work_time: WorkingHours,
) -> CalendarTemplate {
    let working_days = cycle.weekly_projection(&work_time);
    CalendarTemplate {
        template_type,
        name: name.to_string(),
        description: description.to_string(),
        short_description: short_description.to_string(),
        hours_per_day,
        working_days_per_week: working_days.working_day_count(),
        working_days,
        default_work_time: work_time,
        cycle: Some(cycle),
    }
}

/// Weekly pattern of the standard 5/2 archetype.
pub fn standard_work_time() -> WorkingHours {
    WorkingHours::new("09:00", "18:00").with_break("13:00", "14:00")
}

pub fn standard_pattern() -> WeeklyPattern {
    WeeklyPattern::uniform(&WEEKDAYS, &standard_work_time())
}

fn builtin_templates() -> Vec<CalendarTemplate> {
    vec![
        weekly(
            TemplateType::Standard,
            "Standard (5/2)",
            "Five working days Monday to Friday, 09:00-18:00 with a one-hour lunch break",
            "5/2, 8h",
            8.0,
            &WEEKDAYS,
            standard_work_time(),
        ),
        weekly(
            TemplateType::TwentyFourSeven,
            "24/7",
            "Continuous operation every day around the clock",
            "24/7, 24h",
            24.0,
            &crate::calendar::MONDAY_FIRST,
            WorkingHours::new("00:00", "24:00"),
        ),
        weekly(
            TemplateType::NightShift,
            "Night shift",
            "Five night shifts Monday to Friday, 22:00-06:00",
            "5/2 nights, 8h",
            8.0,
            &WEEKDAYS,
            WorkingHours::new("22:00", "06:00"),
        ),
        rotating(
            TemplateType::TwoOnTwoOff,
            "Shift 2/2",
            "Two 12-hour day shifts followed by two days off",
            "2/2, 12h",
            12.0,
            ShiftCycle::new(2, 2),
            WorkingHours::new("08:00", "20:00"),
        ),
        rotating(
            TemplateType::ThreeOnOneOff,
            "Shift 3/1",
            "Three 12-hour shifts followed by one day off",
            "3/1, 12h",
            12.0,
            ShiftCycle::new(3, 1),
            WorkingHours::new("08:00", "20:00"),
        ),
        weekly(
            TemplateType::FourOnThreeOff,
            "Compressed week (4/3)",
            "Four 10-hour days Monday to Thursday, Friday to Sunday off",
            "4/3, 10h",
            10.0,
            &WEEKDAYS[..4],
            WorkingHours::new("08:00", "19:00").with_break("12:00", "13:00"),
        ),
        rotating(
            TemplateType::FifteenOnFifteenOff,
            "Rotation 15/15",
            "Fifteen consecutive 11-hour days on site followed by fifteen days off",
            "15/15, 11h",
            11.0,
            ShiftCycle::new(15, 15),
            WorkingHours::new("08:00", "20:00").with_break("13:00", "14:00"),
        ),
        rotating(
            TemplateType::ThirtyOnThirtyOff,
            "Rotation 30/30",
            "Thirty consecutive 11-hour days on site followed by thirty days off",
            "30/30, 11h",
            11.0,
            ShiftCycle::new(30, 30),
            WorkingHours::new("08:00", "20:00").with_break("13:00", "14:00"),
        ),
        weekly(
            TemplateType::SixDay,
            "Six-day week (6/1)",
            "Six working days Monday to Saturday, Sunday off",
            "6/1, 7h",
            7.0,
            &crate::calendar::MONDAY_FIRST[..6],
            WorkingHours::new("09:00", "17:00").with_break("13:00", "14:00"),
        ),
    ]
}

/// Read-only set of archetypes, built once and handed to consumers.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<CalendarTemplate>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    /// All archetypes in their fixed display order.
    pub fn all_templates(&self) -> &[CalendarTemplate] {
        &self.templates
    }

    pub fn template_by_type(&self, template_type: TemplateType) -> Option<&CalendarTemplate> {
        self.templates
            .iter()
            .find(|template| template.template_type == template_type)
    }

    pub fn variants(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.templates
            .iter()
            .map(|template| (template.template_type.as_str(), template.name.as_str()))
    }
}
