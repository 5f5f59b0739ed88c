//! In-process table store
//!
//! Holds tables as row vectors and logs every call, which is what a dry run
//! reports and what tests assert on.

use crate::error::Result;
use crate::store::types::{DeleteResponse, EqFilter, InsertResponse};
use crate::store::TableStore;
use async_trait::async_trait;
use livesim_common::types::Record;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One call received by an [`InMemoryTableStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Insert { table: String, records: usize },
    Delete { table: String, filters: Vec<EqFilter> },
}

#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    calls: Mutex<Vec<StoreCall>>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `table` without logging a call
    pub fn seed(&self, table: &str, records: impl IntoIterator<Item = Record>) {
        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .extend(records);
    }

    /// Current rows of `table`
    pub fn rows(&self, table: &str) -> Vec<Record> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    /// Record counts of each insert call, in order
    pub fn insert_sizes(&self) -> Vec<usize> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                StoreCall::Insert { records, .. } => Some(*records),
                StoreCall::Delete { .. } => None,
            })
            .collect()
    }

    /// Number of delete calls received
    pub fn delete_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, StoreCall::Delete { .. }))
            .count()
    }
}

// A poisoned lock only means another caller panicked mid-call; the data is
// still a valid table.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn insert(&self, table: &str, records: &[Record]) -> Result<InsertResponse> {
        lock(&self.calls).push(StoreCall::Insert {
            table: table.to_string(),
            records: records.len(),
        });

        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .extend_from_slice(records);

        Ok(InsertResponse {
            submitted: records.len(),
            returned: Some(records.len()),
        })
    }

    async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<DeleteResponse> {
        lock(&self.calls).push(StoreCall::Delete {
            table: table.to_string(),
            filters: filters.to_vec(),
        });

        let mut tables = lock(&self.tables);
        let removed = match tables.get_mut(table) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|row| !filters.iter().all(|f| f.matches(row)));
                before - rows.len()
            }
            None => 0,
        };

        Ok(DeleteResponse {
            returned: Some(removed),
        })
    }
}
