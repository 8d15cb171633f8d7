use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{ChangeBatch, ChangeEvent, Record};

/// What applying one batch did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub added: usize,
    pub modified: usize,
    /// Records dropped by `removed` events.
    pub removed: usize,
    /// Well-formed events that matched nothing (`modified`/`removed` of an
    /// unknown id).
    pub ignored: usize,
    /// Events whose document failed validation.
    pub rejected: usize,
}

/// Local replica of the remote activity collection.
///
/// Holds at most one record per id. Order is arrival order and carries no
/// meaning; the chart re-sorts on every render.
#[derive(Debug, Clone, Default)]
pub struct MirrorStore {
    records: Vec<Record>,
}

impl MirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id.as_str() == id)
    }

    /// Distinct activity categories currently present, sorted.
    pub fn activities(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.activity.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Apply every change of a batch in delivery order.
    ///
    /// Changes that do not decode or validate are skipped; the rest of the
    /// batch still applies.
    pub fn apply_batch(&mut self, batch: ChangeBatch) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, event) in batch.events().enumerate() {
            match event {
                Ok(event) => self.apply(event, &mut report),
                Err(err) => {
                    warn!(index, %err, "rejected change");
                    report.rejected += 1;
                }
            }
        }
        debug!(
            added = report.added,
            modified = report.modified,
            removed = report.removed,
            ignored = report.ignored,
            rejected = report.rejected,
            size = self.records.len(),
            "applied change batch"
        );
        report
    }

    /// Apply a single validated change.
    pub fn apply(&mut self, event: ChangeEvent, report: &mut BatchReport) {
        match event {
            ChangeEvent::Added(record) => {
                if let Some(slot) = self.records.iter_mut().find(|r| r.id == record.id) {
                    debug!(id = %record.id, "added an id already present, replacing");
                    *slot = record;
                } else {
                    self.records.push(record);
                }
                report.added += 1;
            }
            ChangeEvent::Modified(record) => {
                match self.records.iter_mut().find(|r| r.id == record.id) {
                    Some(slot) => {
                        *slot = record;
                        report.modified += 1;
                    }
                    None => {
                        debug!(id = %record.id, "modified an unknown id, ignoring");
                        report.ignored += 1;
                    }
                }
            }
            ChangeEvent::Removed(id) => {
                let before = self.records.len();
                self.records.retain(|r| r.id != id);
                let dropped = before - self.records.len();
                if dropped == 0 {
                    debug!(%id, "removed an unknown id, ignoring");
                    report.ignored += 1;
                }
                report.removed += dropped;
            }
        }
    }
}
