//! Mapping from records to the two plotted values, and the category filter
//! that picks which records a chart shows.

use chrono::{DateTime, Utc};

use crate::model::Record;

/// x value of a record.
pub fn time_of(record: &Record) -> DateTime<Utc> {
    record.date
}

/// y value of a record.
pub fn magnitude_of(record: &Record) -> f64 {
    record.distance
}

/// Selects the records of one activity category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFilter {
    activity: String,
}

impl ActivityFilter {
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
        }
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn matches(&self, record: &Record) -> bool {
        record.activity == self.activity
    }
}

/// Filter `records` to the selected activity and order them by date.
///
/// Records with equal dates keep their relative input order.
pub fn plotted<'a>(records: &'a [Record], filter: &ActivityFilter) -> Vec<&'a Record> {
    let mut selected: Vec<&Record> = records.iter().filter(|r| filter.matches(r)).collect();
    selected.sort_by_key(|r| time_of(r));
    selected
}

/// `(min, max)` of the record dates, `None` when empty.
pub fn time_extent(records: &[&Record]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let min = records.iter().map(|r| time_of(r)).min()?;
    let max = records.iter().map(|r| time_of(r)).max()?;
    Some((min, max))
}

/// Largest distance, 0 when empty.
pub fn max_magnitude(records: &[&Record]) -> f64 {
    records
        .iter()
        .map(|r| magnitude_of(r))
        .fold(0.0, f64::max)
}
