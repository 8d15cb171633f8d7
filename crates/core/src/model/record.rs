use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Why a change or its document could not be turned into a [`Record`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("field `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("malformed change: {0}")]
    Malformed(String),
}

/// Opaque document identifier.
///
/// Cloned on every render for marker keys, so it shares one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Arc<str>);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(Arc::from(s))
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId(Arc::from(s.as_str()))
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// One activity entry: when it happened, how far, and what kind.
///
/// Fields other than the four the chart reads are kept in `extra` and
/// written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub date: DateTime<Utc>,
    pub distance: f64,
    pub activity: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(
        id: impl Into<RecordId>,
        date: DateTime<Utc>,
        distance: f64,
        activity: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            distance,
            activity: activity.into(),
            extra: Map::new(),
        }
    }

    /// Validate a raw document (`{id, date, distance, activity, ...}`).
    ///
    /// `id` may be a string or a number. `date` may be an RFC 3339 string, a
    /// `YYYY-MM-DD` date (midnight UTC), epoch milliseconds, or a
    /// `{seconds, nanoseconds}` timestamp object.
    pub fn from_document(mut doc: Map<String, Value>) -> Result<Self, RecordError> {
        let id = take_id(&mut doc)?;
        let date = match doc.remove("date") {
            Some(value) => parse_date_value(&value)?,
            None => return Err(RecordError::Missing("date")),
        };
        let distance = match doc.remove("distance") {
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| RecordError::Invalid {
                field: "distance",
                reason: format!("{n} is not representable"),
            })?,
            Some(other) => {
                return Err(RecordError::Invalid {
                    field: "distance",
                    reason: format!("expected a number, got {other}"),
                });
            }
            None => return Err(RecordError::Missing("distance")),
        };
        if distance < 0.0 {
            return Err(RecordError::Invalid {
                field: "distance",
                reason: format!("{distance} is negative"),
            });
        }
        let activity = match doc.remove("activity") {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(RecordError::Invalid {
                    field: "activity",
                    reason: format!("expected a string, got {other}"),
                });
            }
            None => return Err(RecordError::Missing("activity")),
        };

        Ok(Self {
            id,
            date,
            distance,
            activity,
            extra: doc,
        })
    }

    /// Inverse of [`Record::from_document`]; dates are written as RFC 3339.
    pub fn into_document(self) -> Map<String, Value> {
        let mut doc = self.extra;
        doc.insert("id".into(), Value::String(self.id.to_string()));
        doc.insert("date".into(), Value::String(self.date.to_rfc3339()));
        doc.insert(
            "distance".into(),
            Number::from_f64(self.distance).map_or(Value::Null, Value::Number),
        );
        doc.insert("activity".into(), Value::String(self.activity));
        doc
    }
}

/// Pull the `id` out of a document, accepting strings and numbers.
pub(crate) fn take_id(doc: &mut Map<String, Value>) -> Result<RecordId, RecordError> {
    match doc.remove("id") {
        Some(Value::String(s)) if !s.is_empty() => Ok(RecordId::from(s)),
        Some(Value::Number(n)) => Ok(RecordId::from(n.to_string())),
        Some(other) => Err(RecordError::Invalid {
            field: "id",
            reason: format!("expected a non-empty string or number, got {other}"),
        }),
        None => Err(RecordError::Missing("id")),
    }
}

fn parse_date_value(value: &Value) -> Result<DateTime<Utc>, RecordError> {
    let invalid = |reason: String| RecordError::Invalid {
        field: "date",
        reason,
    };
    match value {
        Value::String(s) => parse_date(s).ok_or_else(|| invalid(format!("unparseable date {s:?}"))),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| invalid(format!("{n} is not epoch milliseconds"))),
        Value::Object(obj) => {
            let seconds = obj.get("seconds").and_then(Value::as_i64);
            let nanos = obj
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            seconds
                .and_then(|s| DateTime::from_timestamp(s, u32::try_from(nanos).ok()?))
                .ok_or_else(|| invalid("timestamp object needs integer `seconds`".into()))
        }
        other => Err(invalid(format!("unsupported date value {other}"))),
    }
}

/// Parse the textual date forms the activity collection contains.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture is not an object"),
        }
    }

    #[test]
    fn parses_minimal_document() {
        let record = Record::from_document(doc(json!({
            "id": 1,
            "date": "2024-01-02",
            "distance": 5,
            "activity": "run",
        })))
        .unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(record.date, parse_date("2024-01-02T00:00:00Z").unwrap());
        assert_eq!(record.distance, 5.0);
        assert_eq!(record.activity, "run");
        assert!(record.extra.is_empty());
    }

    #[test]
    fn keeps_unknown_fields() {
        let record = Record::from_document(doc(json!({
            "id": "abc",
            "date": "2024-03-01T08:30:00.000Z",
            "distance": 12.5,
            "activity": "cycling",
            "note": "windy",
        })))
        .unwrap();
        assert_eq!(record.extra.get("note"), Some(&json!("windy")));
        let back = record.into_document();
        assert_eq!(back.get("note"), Some(&json!("windy")));
        assert_eq!(back.get("id"), Some(&json!("abc")));
    }

    #[test]
    fn accepts_numeric_and_timestamp_dates() {
        let millis = Record::from_document(doc(json!({
            "id": "a", "date": 1_704_153_600_000_i64, "distance": 1, "activity": "run",
        })))
        .unwrap();
        let stamp = Record::from_document(doc(json!({
            "id": "b", "date": {"seconds": 1_704_153_600_i64, "nanoseconds": 0},
            "distance": 1, "activity": "run",
        })))
        .unwrap();
        assert_eq!(millis.date, stamp.date);
        assert_eq!(millis.date, parse_date("2024-01-02").unwrap());
    }

    #[test]
    fn rejects_missing_and_invalid_fields() {
        let missing = Record::from_document(doc(json!({"id": "a", "distance": 1, "activity": "run"})));
        assert_eq!(missing, Err(RecordError::Missing("date")));

        let negative = Record::from_document(doc(json!({
            "id": "a", "date": "2024-01-01", "distance": -3, "activity": "run",
        })));
        assert!(matches!(
            negative,
            Err(RecordError::Invalid { field: "distance", .. })
        ));

        let bad_date = Record::from_document(doc(json!({
            "id": "a", "date": "yesterday", "distance": 1, "activity": "run",
        })));
        assert!(matches!(bad_date, Err(RecordError::Invalid { field: "date", .. })));

        let no_id = Record::from_document(doc(json!({
            "date": "2024-01-01", "distance": 1, "activity": "run",
        })));
        assert_eq!(no_id, Err(RecordError::Missing("id")));
    }
}
