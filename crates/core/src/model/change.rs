use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::{Record, RecordError, RecordId, take_id};

/// The three kinds of delta a live query reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One change as it arrives on the wire:
/// `{"type": "added", "doc": {"id": "...", ...}}`.
///
/// The document is kept untyped until the store validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub doc: Map<String, Value>,
}

/// A validated change.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Added(Record),
    Modified(Record),
    Removed(RecordId),
}

impl ChangeEvent {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::Added(_) => ChangeKind::Added,
            ChangeEvent::Modified(_) => ChangeKind::Modified,
            ChangeEvent::Removed(_) => ChangeKind::Removed,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            ChangeEvent::Added(r) | ChangeEvent::Modified(r) => &r.id,
            ChangeEvent::Removed(id) => id,
        }
    }
}

impl TryFrom<DocumentChange> for ChangeEvent {
    type Error = RecordError;

    /// `removed` only needs an `id`; the other kinds need a full record.
    fn try_from(change: DocumentChange) -> Result<Self, Self::Error> {
        match change.kind {
            ChangeKind::Added => Record::from_document(change.doc).map(ChangeEvent::Added),
            ChangeKind::Modified => Record::from_document(change.doc).map(ChangeEvent::Modified),
            ChangeKind::Removed => {
                let mut doc = change.doc;
                take_id(&mut doc).map(ChangeEvent::Removed)
            }
        }
    }
}

impl From<ChangeEvent> for DocumentChange {
    fn from(event: ChangeEvent) -> Self {
        match event {
            ChangeEvent::Added(record) => DocumentChange {
                kind: ChangeKind::Added,
                doc: record.into_document(),
            },
            ChangeEvent::Modified(record) => DocumentChange {
                kind: ChangeKind::Modified,
                doc: record.into_document(),
            },
            ChangeEvent::Removed(id) => {
                let mut doc = Map::new();
                doc.insert("id".into(), Value::String(id.to_string()));
                DocumentChange {
                    kind: ChangeKind::Removed,
                    doc,
                }
            }
        }
    }
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
        }
    }
}

impl TryFrom<Value> for DocumentChange {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).map_err(|err| RecordError::Malformed(err.to_string()))
    }
}

impl From<DocumentChange> for Value {
    fn from(change: DocumentChange) -> Self {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(change.kind.as_str().into()));
        obj.insert("doc".into(), Value::Object(change.doc));
        Value::Object(obj)
    }
}

/// All changes observed in one snapshot transition, in delivery order.
///
/// Entries stay raw JSON so that one malformed change (an unknown `type`, a
/// `doc` that is not an object) is rejected on its own when the batch is
/// applied instead of failing the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeBatch {
    pub changes: Vec<Value>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a batch from its JSON array form. Only the array itself has to
    /// be well formed here.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_events(events: impl IntoIterator<Item = ChangeEvent>) -> Self {
        Self {
            changes: events
                .into_iter()
                .map(|event| Value::from(DocumentChange::from(event)))
                .collect(),
        }
    }

    pub fn push(&mut self, event: ChangeEvent) {
        self.changes.push(DocumentChange::from(event).into());
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Decode and validate every change, in delivery order.
    pub fn events(self) -> impl Iterator<Item = Result<ChangeEvent, RecordError>> {
        self.changes
            .into_iter()
            .map(|value| DocumentChange::try_from(value).and_then(ChangeEvent::try_from))
    }
}
