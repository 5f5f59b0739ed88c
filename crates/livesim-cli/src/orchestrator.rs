//! One replay cycle: load, inject, pause, clean up
//!
//! Stage failures at batch or key level are folded into the returned
//! [`RunSummary`]; only load errors come back as `Err`.

use crate::cleaner::{self, CleanupReport};
use crate::config::ReplaySettings;
use crate::error::Result;
use crate::injector::{self, BatchOutcome, InjectionReport};
use crate::loader;
use crate::pacing::Waiter;
use crate::store::TableStore;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

/// Exit code when every batch and key succeeded, or the dataset was empty
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code when the cycle finished but some batch or key failed
pub const EXIT_PARTIAL: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Completed,
    CompletedWithFailures,
    /// Dataset parsed but had no rows; nothing was sent to the store
    AbortedEmpty,
}

/// Aggregated outcome of one cycle
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub table: String,
    pub source: PathBuf,
    pub records_loaded: usize,
    pub status: CycleStatus,
    pub batches: Vec<BatchOutcome>,
    /// Keys recorded during injection and handed to cleanup
    pub ledger_size: usize,
    pub cleanup: CleanupReport,
}

impl RunSummary {
    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|b| !b.is_success()).count()
    }

    pub fn uploaded_records(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.is_success())
            .map(|b| b.submitted)
            .sum()
    }

    pub fn exit_code(&self) -> i32 {
        match self.status {
            CycleStatus::Completed | CycleStatus::AbortedEmpty => EXIT_SUCCESS,
            CycleStatus::CompletedWithFailures => EXIT_PARTIAL,
        }
    }
}

/// Run exactly one injection/cleanup cycle against `store`.
///
/// Credentials must already have been validated and the store built; this
/// starts at the loader.
pub async fn run_cycle<S, W>(settings: &ReplaySettings, store: &S, waiter: &W) -> Result<RunSummary>
where
    S: TableStore + ?Sized,
    W: Waiter + ?Sized,
{
    let started_at = Utc::now();
    let dataset = loader::load(&settings.input)?;

    if dataset.is_empty() {
        warn!(path = %settings.input.display(), "No data loaded; nothing to replay");
        return Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            table: settings.table.clone(),
            source: dataset.source,
            records_loaded: 0,
            status: CycleStatus::AbortedEmpty,
            batches: Vec::new(),
            ledger_size: 0,
            cleanup: CleanupReport::default(),
        });
    }

    info!(table = %settings.table, "Starting single injection cycle");

    let InjectionReport { ledger, batches } = injector::inject(
        store,
        waiter,
        &settings.table,
        &dataset.records,
        &settings.pacing,
    )
    .await;
    let ledger_size = ledger.len();

    info!(
        delay_secs = settings.pacing.cleanup_delay.as_secs_f64(),
        "Waiting for the final dashboard refresh before cleanup"
    );
    waiter.wait(settings.pacing.cleanup_delay).await;

    let cleanup = cleaner::cleanup(store, &settings.table, ledger).await;

    let any_failed = batches.iter().any(|b| !b.is_success()) || cleanup.failed_keys() > 0;
    let status = if any_failed {
        CycleStatus::CompletedWithFailures
    } else {
        CycleStatus::Completed
    };

    info!(?status, "Cycle complete");

    Ok(RunSummary {
        started_at,
        finished_at: Utc::now(),
        table: settings.table.clone(),
        source: dataset.source,
        records_loaded: dataset.records.len(),
        status,
        batches,
        ledger_size,
        cleanup,
    })
}
