//! Batch injection
//!
//! Uploads records in source order, one insert call per batch, pausing
//! between batches. A failed batch is logged and skipped; it never aborts the
//! cycle and none of its keys reach the ledger.

use crate::config::Pacing;
use crate::pacing::Waiter;
use crate::store::TableStore;
use livesim_common::types::{IdentityKey, Record};
use tracing::{info, warn};

/// Identity keys of every record submitted in a successful insert call.
///
/// Append-only while injecting; handed to the cleaner by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionLedger {
    keys: Vec<IdentityKey>,
}

impl InjectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn extend(&mut self, keys: Vec<IdentityKey>) {
        self.keys.extend(keys);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[IdentityKey] {
        &self.keys
    }
}

impl FromIterator<IdentityKey> for InjectionLedger {
    fn from_iter<I: IntoIterator<Item = IdentityKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for InjectionLedger {
    type Item = IdentityKey;
    type IntoIter = std::vec::IntoIter<IdentityKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Insert call succeeded; `acknowledged` is how many rows the store echoed
    Uploaded { acknowledged: Option<usize> },
    Failed { reason: String },
}

/// What happened to one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Zero-based position in upload order
    pub index: usize,
    pub submitted: usize,
    pub status: BatchStatus,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, BatchStatus::Uploaded { .. })
    }
}

/// Ledger plus per-batch outcomes for one injection phase
#[derive(Debug, Clone, Default)]
pub struct InjectionReport {
    pub ledger: InjectionLedger,
    pub batches: Vec<BatchOutcome>,
}

impl InjectionReport {
    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|b| !b.is_success()).count()
    }

    /// Records submitted in batches whose insert call succeeded
    pub fn uploaded_records(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.is_success())
            .map(|b| b.submitted)
            .sum()
    }
}

/// Upload `records` to `table` in batches of `pacing.batch_size`.
///
/// Waits `pacing.batch_delay` between batches, never after the last. Ledger
/// keys come from the submitted records, not from the store's echo, so a row
/// the store silently dropped still gets a (harmless) cleanup delete.
pub async fn inject<S, W>(
    store: &S,
    waiter: &W,
    table: &str,
    records: &[Record],
    pacing: &Pacing,
) -> InjectionReport
where
    S: TableStore + ?Sized,
    W: Waiter + ?Sized,
{
    let mut report = InjectionReport::default();
    let batch_count = records.len().div_ceil(pacing.batch_size);

    info!(
        records = records.len(),
        batches = batch_count,
        batch_size = pacing.batch_size,
        "Starting data injection"
    );

    for (index, batch) in records.chunks(pacing.batch_size).enumerate() {
        let outcome = upload_batch(store, table, index, batch, &mut report.ledger).await;
        report.batches.push(outcome);

        if index + 1 < batch_count {
            info!(delay_secs = pacing.batch_delay.as_secs_f64(), "Waiting before next batch");
            waiter.wait(pacing.batch_delay).await;
        }
    }

    info!(
        uploaded = report.uploaded_records(),
        failed_batches = report.failed_batches(),
        ledger = report.ledger.len(),
        "Data injection complete"
    );

    report
}

async fn upload_batch<S>(
    store: &S,
    table: &str,
    index: usize,
    batch: &[Record],
    ledger: &mut InjectionLedger,
) -> BatchOutcome
where
    S: TableStore + ?Sized,
{
    let failed = |reason: String| {
        warn!(batch = index + 1, records = batch.len(), error = %reason, "Batch upload failed");
        BatchOutcome {
            index,
            submitted: batch.len(),
            status: BatchStatus::Failed { reason },
        }
    };

    let keys = match batch
        .iter()
        .map(IdentityKey::from_record)
        .collect::<livesim_common::Result<Vec<_>>>()
    {
        Ok(keys) => keys,
        Err(e) => return failed(e.to_string()),
    };

    match store.insert(table, batch).await {
        Ok(response) => {
            let total = ledger.len() + keys.len();
            ledger.extend(keys);

            match response.returned {
                Some(acknowledged) if acknowledged < batch.len() => warn!(
                    batch = index + 1,
                    submitted = batch.len(),
                    acknowledged,
                    "Store acknowledged fewer rows than submitted; cleanup will still target all of them"
                ),
                Some(acknowledged) => {
                    info!(batch = index + 1, records = acknowledged, total, "Uploaded batch")
                }
                None => info!(
                    batch = index + 1,
                    records = batch.len(),
                    total,
                    "Executed batch insert"
                ),
            }

            BatchOutcome {
                index,
                submitted: batch.len(),
                status: BatchStatus::Uploaded {
                    acknowledged: response.returned,
                },
            }
        }
        Err(e) => failed(e.to_string()),
    }
}
