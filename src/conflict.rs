//! Task vs. resource-calendar conflicts.

use crate::calendar::{WorkCalendar, short_weekday_name};
use crate::catalog::CalendarCatalog;
use crate::resource::{Resource, ResourceType};
use crate::task::Task;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictingResource {
    pub resource_id: String,
    pub resource_name: String,
    pub calendar_name: String,
    pub reason: String,
    /// Days inside the task range the calendar marks as non-working.
    pub conflicting_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResult {
    pub has_conflict: bool,
    pub conflicting_resources: Vec<ConflictingResource>,
}

impl ConflictResult {
    pub fn none() -> Self {
        Self::default()
    }

    fn from_resources(conflicting_resources: Vec<ConflictingResource>) -> Self {
        Self {
            has_conflict: !conflicting_resources.is_empty(),
            conflicting_resources,
        }
    }
}

/// Resources and calendars keyed by id for repeated lookups.
struct LookupIndex<'d> {
    resources: HashMap<&'d str, &'d Resource>,
    calendars: HashMap<&'d str, &'d WorkCalendar>,
}

impl<'d> LookupIndex<'d> {
    fn new(resources: &'d [Resource], calendars: &'d [WorkCalendar]) -> Self {
        Self {
            resources: resources.iter().map(|r| (r.id.as_str(), r)).collect(),
            calendars: calendars.iter().map(|c| (c.id.as_str(), c)).collect(),
        }
    }

    /// Calendar governing `resource_id`, if it is a work resource with a known calendar.
    fn calendar_for(&self, resource_id: &str) -> Option<(&'d Resource, &'d WorkCalendar)> {
        let Some(resource) = self.resources.get(resource_id).copied() else {
            debug!(resource_id, "assigned resource not found, skipping");
            return None;
        };
        if resource.resource_type != ResourceType::Work {
            return None;
        }
        let calendar_id = resource.calendar_id.as_deref()?;
        match self.calendars.get(calendar_id).copied() {
            Some(calendar) => Some((resource, calendar)),
            None => {
                debug!(resource_id, calendar_id, "resource calendar not found, treating as unconstrained");
                None
            }
        }
    }
}

/// Reports assigned resources whose calendar has non-working days inside a task.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector<'a> {
    catalog: &'a CalendarCatalog,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(catalog: &'a CalendarCatalog) -> Self {
        Self { catalog }
    }

    pub fn check_task_conflict(
        &self,
        task: &Task,
        resources: &[Resource],
        calendars: &[WorkCalendar],
    ) -> ConflictResult {
        if task.assigned_resource_ids.is_empty() || task.is_aggregate() {
            return ConflictResult::none();
        }
        let index = LookupIndex::new(resources, calendars);
        self.check_indexed(task, &index)
    }

    /// Checks every task, in parallel, returning `(task id, result)` in input order.
    pub fn check_tasks(
        &self,
        tasks: &[Task],
        resources: &[Resource],
        calendars: &[WorkCalendar],
    ) -> Vec<(String, ConflictResult)> {
        let index = LookupIndex::new(resources, calendars);
        tasks
            .par_iter()
            .map(|task| {
                let result = if task.assigned_resource_ids.is_empty() || task.is_aggregate() {
                    ConflictResult::none()
                } else {
                    self.check_indexed(task, &index)
                };
                (task.id.clone(), result)
            })
            .collect()
    }

    fn check_indexed(&self, task: &Task, index: &LookupIndex<'_>) -> ConflictResult {
        let mut conflicting = Vec::new();
        for resource_id in &task.assigned_resource_ids {
            let Some((resource, calendar)) = index.calendar_for(resource_id) else {
                continue;
            };
            let off_days: Vec<NaiveDate> = task
                .days()
                .filter(|date| !self.catalog.is_working_day(calendar, *date))
                .collect();
            trace!(
                task = %task.id,
                resource = %resource.id,
                calendar = %calendar.id,
                off_days = off_days.len(),
                "scanned task range"
            );
            if off_days.is_empty() {
                continue;
            }
            conflicting.push(ConflictingResource {
                resource_id: resource.id.clone(),
                resource_name: resource.name.clone(),
                calendar_name: calendar.name.clone(),
                reason: self.non_working_reason(calendar),
                conflicting_dates: off_days,
            });
        }
        ConflictResult::from_resources(conflicting)
    }

    /// Explains a calendar's regular days off, Monday first, independent of
    /// any particular task range.
    pub fn non_working_reason(&self, calendar: &WorkCalendar) -> String {
        if let Some(rotation) = &calendar.rotation {
            return format!(
                "Rotating schedule: {} on / {} off",
                rotation.cycle.on_days, rotation.cycle.off_days
            );
        }
        let off = calendar.working_days.non_working_weekdays();
        match off.len() {
            0 => "Schedule does not match".to_string(),
            7 => "All days are non-working".to_string(),
            _ => {
                let names = off
                    .iter()
                    .map(|day| short_weekday_name(*day))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Non-working days: {names}")
            }
        }
    }

    /// Calendar-adjusted working hours over the task's range.
    pub fn actual_working_hours(&self, task: &Task, calendar: &WorkCalendar) -> f64 {
        task.days()
            .map(|date| self.catalog.working_hours(calendar, date))
            .sum()
    }
}
