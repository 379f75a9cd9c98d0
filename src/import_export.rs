//! Reading collaborator snapshots and exporting day reports.

use crate::calendar::WorkCalendar;
use crate::error::ImportExportError;
use crate::normalize::{DateInput, DateNormalizer};
use crate::report::DayReport;
use crate::resource::Resource;
use crate::task::Task;
use chrono::TimeZone;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::warn;

pub type ImportExportResult<T> = Result<T, ImportExportError>;

/// Backend dates arrive either as ISO strings or epoch milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawDate {
    Millis(i64),
    Text(String),
}

impl From<RawDate> for DateInput {
    fn from(value: RawDate) -> Self {
        match value {
            RawDate::Millis(ms) => DateInput::EpochMillis(ms),
            RawDate::Text(text) => DateInput::Iso(text),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: String,
    #[serde(default)]
    name: String,
    start_date: RawDate,
    end_date: RawDate,
    #[serde(default)]
    is_summary: bool,
    #[serde(default)]
    is_milestone: bool,
    #[serde(default)]
    assigned_resource_ids: Vec<String>,
}

impl TaskRecord {
    fn into_task<Tz: TimeZone>(self, normalizer: &DateNormalizer<Tz>) -> ImportExportResult<Task> {
        let date_error = |source| ImportExportError::TaskDate {
            task_id: self.id.clone(),
            source,
        };
        let start_date = normalizer
            .calendar_day(self.start_date.clone())
            .map_err(date_error)?;
        let end_date = normalizer
            .backend_end_day(self.end_date.clone())
            .map_err(date_error)?;
        if end_date < start_date {
            warn!(task = %self.id, %start_date, %end_date, "task ends before it starts");
        }
        Ok(Task {
            id: self.id,
            name: self.name,
            start_date,
            end_date,
            is_summary: self.is_summary,
            is_milestone: self.is_milestone,
            assigned_resource_ids: self.assigned_resource_ids,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProjectSnapshot {
    #[serde(default)]
    calendars: Vec<WorkCalendar>,
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    tasks: Vec<TaskRecord>,
}

/// Calendars, resources and tasks handed over by the project data store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub calendars: Vec<WorkCalendar>,
    pub resources: Vec<Resource>,
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn calendar(&self, id: &str) -> Option<&WorkCalendar> {
        self.calendars.iter().find(|calendar| calendar.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

/// Keeps the last exception for each day, so the one-per-day rule holds.
fn dedupe_exceptions(mut calendar: WorkCalendar) -> WorkCalendar {
    if calendar.validate().is_ok() {
        return calendar;
    }
    warn!(calendar = %calendar.id, "duplicate exception dates, keeping the last of each");
    let mut last_index = HashMap::new();
    for (idx, exc) in calendar.exceptions.iter().enumerate() {
        last_index.insert(exc.date, idx);
    }
    let mut idx = 0;
    calendar.exceptions.retain(|exc| {
        let keep = last_index.get(&exc.date) == Some(&idx);
        idx += 1;
        keep
    });
    calendar
}

fn into_project<Tz: TimeZone>(
    snapshot: ProjectSnapshot,
    normalizer: &DateNormalizer<Tz>,
) -> ImportExportResult<Project> {
    let calendars = snapshot
        .calendars
        .into_iter()
        .map(dedupe_exceptions)
        .collect();
    let tasks = snapshot
        .tasks
        .into_iter()
        .map(|record| record.into_task(normalizer))
        .collect::<ImportExportResult<Vec<_>>>()?;
    Ok(Project {
        calendars,
        resources: snapshot.resources,
        tasks,
    })
}

pub fn project_from_json_str<Tz: TimeZone>(
    json: &str,
    normalizer: &DateNormalizer<Tz>,
) -> ImportExportResult<Project> {
    let snapshot: ProjectSnapshot = serde_json::from_str(json)?;
    into_project(snapshot, normalizer)
}

pub fn load_project_from_json<P: AsRef<Path>, Tz: TimeZone>(
    path: P,
    normalizer: &DateNormalizer<Tz>,
) -> ImportExportResult<Project> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(BufReader::new(file))?;
    into_project(snapshot, normalizer)
}

pub fn write_day_report_csv<W: Write>(writer: W, rows: &[DayReport]) -> ImportExportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_day_report_to_csv<P: AsRef<Path>>(path: P, rows: &[DayReport]) -> ImportExportResult<()> {
    let file = File::create(path)?;
    write_day_report_csv(file, rows)
}
