pub mod calendar;
pub mod catalog;
pub mod config;
pub mod conflict;
pub mod error;
pub mod ident;
pub mod import_export;
pub mod normalize;
pub mod report;
pub mod resource;
pub mod task;
pub mod templates;

pub use calendar::{
    CalendarException, ClockTime, CyclicPattern, ExceptionKind, SchedulePattern, ShiftCycle,
    TemplateType, WeeklyPattern, WorkCalendar, WorkingDayRule, WorkingHours,
};
pub use catalog::CalendarCatalog;
pub use config::CatalogConfig;
pub use conflict::{ConflictDetector, ConflictResult, ConflictingResource};
pub use error::{CalendarError, ImportExportError, InvalidDateError};
pub use import_export::{
    Project, load_project_from_json, project_from_json_str, save_day_report_to_csv,
    write_day_report_csv,
};
pub use normalize::{DateInput, DateNormalizer};
pub use report::{DayReport, DaySummary, calendar_day_report, summarize_days};
pub use resource::{Resource, ResourceType};
pub use task::Task;
pub use templates::{CalendarTemplate, TemplateCatalog};
