use crate::calendar::days_inclusive;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The part of a scheduled task this crate reads.
///
/// Dates are local calendar days, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_summary: bool,
    #[serde(default)]
    pub is_milestone: bool,
    #[serde(default)]
    pub assigned_resource_ids: Vec<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            is_summary: false,
            is_milestone: false,
            assigned_resource_ids: Vec::new(),
        }
    }

    pub fn with_resources<I, S>(mut self, resource_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assigned_resource_ids = resource_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Summary and milestone tasks carry no work of their own.
    pub fn is_aggregate(&self) -> bool {
        self.is_summary || self.is_milestone
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        days_inclusive(self.start_date, self.end_date)
    }
}
