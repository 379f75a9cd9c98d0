use crate::calendar::{
    CyclicPattern, TemplateType, WeeklyPattern, WorkCalendar, short_weekday_name,
};
use crate::config::CatalogConfig;
use crate::error::CalendarError;
use crate::ident;
use crate::templates::{self, CalendarTemplate, TemplateCatalog};
use chrono::{NaiveDate, Utc};
use tracing::debug;

/// Token of the built-in default calendar id.
const BASE_TOKEN: &str = "00000000";

/// Creates calendars from archetypes and answers per-day questions about them.
#[derive(Debug, Clone, Default)]
pub struct CalendarCatalog {
    templates: TemplateCatalog,
    config: CatalogConfig,
}

impl CalendarCatalog {
    pub fn new(templates: TemplateCatalog, config: CatalogConfig) -> Self {
        Self { templates, config }
    }

    pub fn with_config(config: CatalogConfig) -> Self {
        Self::new(TemplateCatalog::builtin(), config)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn all_templates(&self) -> &[CalendarTemplate] {
        self.templates.all_templates()
    }

    pub fn template_by_type(&self, template_type: TemplateType) -> Option<&CalendarTemplate> {
        self.templates.template_by_type(template_type)
    }

    pub fn template_variants(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.templates.variants()
    }

    /// New calendar copying the template's pattern and hours.
    pub fn create_from_template(
        &self,
        template: &CalendarTemplate,
        custom_name: Option<&str>,
    ) -> WorkCalendar {
        let name = custom_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&template.name)
            .to_string();
        let now = Utc::now();
        let calendar = WorkCalendar {
            id: self.new_id(&name),
            name,
            description: Some(template.description.clone()),
            template_type: template.template_type,
            working_days: template.working_days.clone(),
            exceptions: Vec::new(),
            hours_per_day: template.hours_per_day,
            working_days_per_week: template.working_days_per_week,
            is_base: false,
            rotation: None,
            created_at: now,
            updated_at: now,
        };
        debug!(id = %calendar.id, template = %template.template_type, "created calendar from template");
        calendar
    }

    pub fn create_from_template_type(
        &self,
        template_type: TemplateType,
        custom_name: Option<&str>,
    ) -> Option<WorkCalendar> {
        self.template_by_type(template_type)
            .map(|template| self.create_from_template(template, custom_name))
    }

    /// New calendar seeded with the standard 5/2 week, typed as custom.
    pub fn create_custom_calendar(&self, name: &str) -> WorkCalendar {
        let name = match name.trim() {
            "" => self.config.custom_calendar_name.clone(),
            trimmed => trimmed.to_string(),
        };
        let working_days = templates::standard_pattern();
        let now = Utc::now();
        let calendar = WorkCalendar {
            id: self.new_id(&name),
            name,
            description: None,
            template_type: TemplateType::Custom,
            working_days_per_week: working_days.working_day_count(),
            working_days,
            exceptions: Vec::new(),
            hours_per_day: 8.0,
            is_base: false,
            rotation: None,
            created_at: now,
            updated_at: now,
        };
        debug!(id = %calendar.id, "created custom calendar");
        calendar
    }

    /// The built-in, non-deletable standard calendar.
    pub fn base_calendar(&self) -> Option<WorkCalendar> {
        let template = self.template_by_type(TemplateType::Standard)?;
        let mut calendar = self.create_from_template(template, None);
        calendar.id = ident::format_calendar_id(
            &self.config.id_namespace,
            BASE_TOKEN,
            &ident::name_segment(&template.name, &self.config.fallback_name),
        );
        calendar.is_base = true;
        Some(calendar)
    }

    fn new_id(&self, name: &str) -> String {
        ident::generate_calendar_id(&self.config.id_namespace, name, &self.config.fallback_name)
    }

    pub fn is_working_day(&self, calendar: &WorkCalendar, date: NaiveDate) -> bool {
        calendar.is_working_day(date)
    }

    pub fn working_hours(&self, calendar: &WorkCalendar, date: NaiveDate) -> f64 {
        calendar.working_hours(date)
    }

    /// Whether `working_days` still has the template's shape: the same
    /// working weekdays, with the same window on each of them.
    pub fn is_matching_template(
        &self,
        working_days: &WeeklyPattern,
        template: &CalendarTemplate,
    ) -> bool {
        working_days
            .rules()
            .iter()
            .zip(template.working_days.rules())
            .all(|(ours, theirs)| {
                ours.is_working == theirs.is_working
                    && (!ours.is_working || ours.working_hours == theirs.working_hours)
            })
    }

    /// First weekly archetype `working_days` matches.
    ///
    /// Rotating archetypes only hold a weekly projection of their cycle and
    /// several of them project to the same week, so they are never reported.
    pub fn matching_template(&self, working_days: &WeeklyPattern) -> Option<&CalendarTemplate> {
        self.all_templates()
            .iter()
            .filter(|template| template.cycle.is_none())
            .find(|template| self.is_matching_template(working_days, template))
    }

    /// Applies an edited weekly pattern, reclassifying the calendar as
    /// custom once it no longer matches its template. A reclassified
    /// calendar drops its rotation and follows the edited week.
    pub fn edit_weekly_pattern(
        &self,
        calendar: &WorkCalendar,
        working_days: WeeklyPattern,
    ) -> WorkCalendar {
        let still_matches = self
            .template_by_type(calendar.template_type)
            .is_some_and(|template| self.is_matching_template(&working_days, template));

        let rule_hours: Vec<f64> = working_days
            .rules()
            .iter()
            .filter(|rule| rule.is_working)
            .filter_map(|rule| rule.working_hours.as_ref().and_then(|wh| wh.hours()))
            .collect();

        let mut next = calendar.with_weekly_pattern(working_days);
        if !still_matches {
            debug!(id = %next.id, from = %next.template_type, "calendar no longer matches its template");
            next.template_type = TemplateType::Custom;
            next.rotation = None;
        }
        if !rule_hours.is_empty() {
            next.hours_per_day = rule_hours.iter().sum::<f64>() / rule_hours.len() as f64;
        }
        next
    }

    /// Pins a rotating calendar's cycle to `anchor`, its first on-day.
    pub fn anchor_rotation(
        &self,
        calendar: &WorkCalendar,
        anchor: NaiveDate,
    ) -> Result<WorkCalendar, CalendarError> {
        let (template, cycle) = self
            .template_by_type(calendar.template_type)
            .and_then(|template| template.cycle.map(|cycle| (template, cycle)))
            .ok_or_else(|| CalendarError::NotRotating(calendar.id.clone()))?;
        let hours = calendar
            .working_days
            .rules()
            .iter()
            .find_map(|rule| rule.working_hours.clone())
            .unwrap_or_else(|| template.default_work_time.clone());
        let rotation = CyclicPattern::new(anchor, cycle, Some(hours))?;
        Ok(calendar.with_rotation(rotation))
    }

    /// Compact label such as `8h/day, 5/7 (Mon, Tue, Wed, Thu, Fri)`.
    pub fn short_description(&self, calendar: &WorkCalendar) -> String {
        let hours = format_hours(calendar.hours_per_day);
        if let Some(rotation) = &calendar.rotation {
            return format!(
                "{hours}h/day, {}/{} rotation from {}",
                rotation.cycle.on_days, rotation.cycle.off_days, rotation.anchor
            );
        }
        let working = calendar.working_days.working_weekdays();
        match working.len() {
            0 => "No working days".to_string(),
            7 => format!("{hours}h/day, 7/7 (every day)"),
            n => {
                let days = working
                    .iter()
                    .map(|day| short_weekday_name(*day))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{hours}h/day, {n}/7 ({days})")
            }
        }
    }
}

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        let text = format!("{hours:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_format_without_trailing_zeros() {
        assert_eq!(format_hours(8.0), "8");
        assert_eq!(format_hours(7.5), "7.5");
        assert_eq!(format_hours(7.25), "7.25");
    }
}
