//! Request and response types for table store calls

use livesim_common::types::{filter_text, IdentityKey, Record};
use serde::Deserialize;

/// Equality predicate on one column.
///
/// `value: None` matches `null` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub column: String,
    pub value: Option<String>,
}

impl EqFilter {
    pub fn new(column: impl Into<String>, value: Option<String>) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }

    /// Both halves of an identity key, to be applied together
    pub fn for_key(key: &IdentityKey) -> Vec<EqFilter> {
        key.fields()
            .into_iter()
            .map(|(column, value)| EqFilter::new(column, filter_text(value)))
            .collect()
    }

    /// Whether `record` satisfies this predicate. A missing column never matches.
    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.column)
            .is_some_and(|value| filter_text(value) == self.value)
    }
}

/// Result of an insert call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResponse {
    /// Rows sent in the request
    pub submitted: usize,
    /// Rows the store echoed back, when it returned a representation
    pub returned: Option<usize>,
}

/// Result of a delete call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResponse {
    /// Rows the store reported removed, when it returned a representation
    pub returned: Option<usize>,
}

/// PostgREST error body
#[derive(Debug, Clone, Deserialize)]
pub struct StoreErrorBody {
    pub message: Option<String>,
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl StoreErrorBody {
    /// Human-readable summary, or `None` if the body carried nothing useful
    pub fn summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(code) = self.code.as_deref().filter(|c| !c.is_empty()) {
            parts.push(format!("[{}]", code));
        }
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            parts.push(message.to_string());
        }
        if let Some(details) = self.details.as_deref().filter(|d| !d.is_empty()) {
            parts.push(format!("({})", details));
        }
        if let Some(hint) = self.hint.as_deref().filter(|h| !h.is_empty()) {
            parts.push(format!("hint: {}", hint));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_filters_for_key() {
        let filters = EqFilter::for_key(&IdentityKey::new("2024-01-01T00:00:00", 42));
        assert_eq!(
            filters,
            vec![
                EqFilter::new("datetime", Some("2024-01-01T00:00:00".to_string())),
                EqFilter::new("trip_id", Some("42".to_string())),
            ]
        );
    }

    #[test]
    fn test_filter_matches() {
        let record: Record = [
            ("trip_id".to_string(), json!("T1")),
            ("note".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();

        assert!(EqFilter::new("trip_id", Some("T1".into())).matches(&record));
        assert!(!EqFilter::new("trip_id", Some("T2".into())).matches(&record));
        assert!(EqFilter::new("note", None).matches(&record));
        assert!(!EqFilter::new("missing", None).matches(&record));
    }

    #[test]
    fn test_error_body_summary() {
        let body: StoreErrorBody = serde_json::from_value(json!({
            "code": "42P01",
            "message": "relation \"public.trips\" does not exist",
            "details": null,
            "hint": null
        }))
        .unwrap();

        assert_eq!(
            body.summary().unwrap(),
            "[42P01] relation \"public.trips\" does not exist"
        );

        let empty: StoreErrorBody = serde_json::from_value(json!({})).unwrap();
        assert!(empty.summary().is_none());
    }
}
