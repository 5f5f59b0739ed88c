//! Row and row-address types shared across livesim

use crate::error::{LivesimError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Normalized name of the timestamp half of an identity key.
pub const DATETIME_FIELD: &str = "datetime";

/// Normalized name of the trip half of an identity key.
pub const TRIP_ID_FIELD: &str = "trip_id";

/// Fields every loaded dataset must carry.
pub const REQUIRED_FIELDS: [&str; 2] = [DATETIME_FIELD, TRIP_ID_FIELD];

/// One row of the source dataset, keyed by normalized field name.
///
/// Serializes as a flat JSON object so a slice of records is directly a
/// table-store insert body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The (datetime, trip_id) pair that addresses a replayed row in the store.
///
/// Only unique within a single injection cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityKey {
    pub datetime: Value,
    pub trip_id: Value,
}

impl IdentityKey {
    pub fn new(datetime: impl Into<Value>, trip_id: impl Into<Value>) -> Self {
        Self {
            datetime: datetime.into(),
            trip_id: trip_id.into(),
        }
    }

    /// Derive the key from a source record.
    ///
    /// A field that is present but empty (`null`) still yields a key.
    pub fn from_record(record: &Record) -> Result<Self> {
        let field = |name: &str| {
            record
                .get(name)
                .cloned()
                .ok_or_else(|| LivesimError::MissingField(name.to_string()))
        };

        Ok(Self {
            datetime: field(DATETIME_FIELD)?,
            trip_id: field(TRIP_ID_FIELD)?,
        })
    }

    /// Field/value pairs, in filter order
    pub fn fields(&self) -> [(&'static str, &Value); 2] {
        [(DATETIME_FIELD, &self.datetime), (TRIP_ID_FIELD, &self.trip_id)]
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = |v: &Value| filter_text(v).unwrap_or_else(|| "null".to_string());
        write!(
            f,
            "{}={}, {}={}",
            DATETIME_FIELD,
            text(&self.datetime),
            TRIP_ID_FIELD,
            text(&self.trip_id)
        )
    }
}

/// Render a scalar the way an equality filter compares it.
///
/// Returns `None` for `null`, which can only be matched with an `is null`
/// predicate. Strings are taken verbatim rather than JSON-quoted.
pub fn filter_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
