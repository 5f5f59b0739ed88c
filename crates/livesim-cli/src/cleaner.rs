//! Targeted cleanup
//!
//! Deletes exactly the rows injected in this cycle, one delete call per
//! ledger key since the store has no bulk delete on a composite condition.

use crate::injector::InjectionLedger;
use crate::store::{EqFilter, TableStore};
use livesim_common::types::IdentityKey;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStatus {
    /// Delete call succeeded; `rows` is how many rows the store reported removed
    Deleted { rows: Option<usize> },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyOutcome {
    pub key: IdentityKey,
    pub status: KeyStatus,
}

impl KeyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, KeyStatus::Deleted { .. })
    }
}

/// Per-key outcomes for one cleanup phase
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// True when the ledger was empty and no call was made
    pub skipped: bool,
    pub outcomes: Vec<KeyOutcome>,
}

impl CleanupReport {
    pub fn deleted_keys(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_keys(&self) -> usize {
        self.outcomes.len() - self.deleted_keys()
    }

    /// Rows the store reported removed, over calls that reported a count
    pub fn rows_removed(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| match o.status {
                KeyStatus::Deleted { rows } => rows,
                KeyStatus::Failed { .. } => None,
            })
            .sum()
    }
}

/// Delete every ledger key from `table`.
///
/// A failed delete is logged and counted; the remaining keys are still
/// processed.
pub async fn cleanup<S>(store: &S, table: &str, ledger: InjectionLedger) -> CleanupReport
where
    S: TableStore + ?Sized,
{
    if ledger.is_empty() {
        info!("Cleanup skipped: no injected records to delete");
        return CleanupReport {
            skipped: true,
            outcomes: Vec::new(),
        };
    }

    info!(keys = ledger.len(), "Starting targeted cleanup");

    let mut outcomes = Vec::with_capacity(ledger.len());
    for key in ledger {
        let filters = EqFilter::for_key(&key);
        let status = match store.delete(table, &filters).await {
            Ok(response) => KeyStatus::Deleted {
                rows: response.returned,
            },
            Err(e) => {
                warn!(key = %key, error = %e, "Targeted cleanup failed for key");
                KeyStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        outcomes.push(KeyOutcome { key, status });
    }

    let report = CleanupReport {
        skipped: false,
        outcomes,
    };

    info!(
        deleted = report.deleted_keys(),
        failed = report.failed_keys(),
        rows_removed = report.rows_removed(),
        "Targeted cleanup finished"
    );

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::{CliError, Result};
    use crate::store::{DeleteResponse, InMemoryTableStore, InsertResponse, StoreCall};
    use async_trait::async_trait;
    use livesim_common::types::Record;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ledger(trip_ids: &[&str]) -> InjectionLedger {
        trip_ids
            .iter()
            .map(|id| IdentityKey::new("2024-01-01T00:00:00", *id))
            .collect()
    }

    /// Fails the first delete call, passes the rest through
    struct FirstDeleteFails {
        inner: InMemoryTableStore,
        seen: AtomicUsize,
    }

    #[async_trait]
    impl TableStore for FirstDeleteFails {
        async fn insert(&self, table: &str, records: &[Record]) -> Result<InsertResponse> {
            self.inner.insert(table, records).await
        }

        async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<DeleteResponse> {
            if self.seen.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(CliError::store(500, "statement timeout"));
            }
            self.inner.delete(table, filters).await
        }
    }

    #[tokio::test]
    async fn test_one_delete_per_key_with_both_filters() {
        let store = InMemoryTableStore::new();
        let report = cleanup(&store, "trips", ledger(&["T1", "T2"])).await;

        assert!(!report.skipped);
        assert_eq!(report.deleted_keys(), 2);
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Delete {
                    table: "trips".to_string(),
                    filters: vec![
                        EqFilter::new("datetime", Some("2024-01-01T00:00:00".to_string())),
                        EqFilter::new("trip_id", Some("T1".to_string())),
                    ],
                },
                StoreCall::Delete {
                    table: "trips".to_string(),
                    filters: vec![
                        EqFilter::new("datetime", Some("2024-01-01T00:00:00".to_string())),
                        EqFilter::new("trip_id", Some("T2".to_string())),
                    ],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining_keys() {
        let store = FirstDeleteFails {
            inner: InMemoryTableStore::new(),
            seen: AtomicUsize::new(0),
        };

        let report = cleanup(&store, "trips", ledger(&["T1", "T2", "T3"])).await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.failed_keys(), 1);
        assert_eq!(report.deleted_keys(), 2);
        assert!(!report.outcomes[0].is_success());
        assert_eq!(store.inner.delete_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_ledger_skips_cleanup() {
        let store = InMemoryTableStore::new();
        let report = cleanup(&store, "trips", InjectionLedger::new()).await;

        assert!(report.skipped);
        assert!(report.outcomes.is_empty());
        assert!(store.calls().is_empty());
    }
}
