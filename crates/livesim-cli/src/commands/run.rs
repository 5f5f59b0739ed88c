//! `livesim run` command implementation
//!
//! Validates configuration, builds the table store, runs one cycle and
//! prints the run report.

use crate::cleaner::KeyStatus;
use crate::config::{ReplaySettings, StoreCredentials};
use crate::error::Result;
use crate::injector::BatchStatus;
use crate::orchestrator::{run_cycle, CycleStatus, RunSummary};
use crate::pacing::TokioWaiter;
use crate::store::{InMemoryTableStore, RestTableClient};
use crate::RunArgs;
use colored::Colorize;
use tracing::info;

/// Run one injection and cleanup cycle, returning the process exit code
pub async fn run(args: &RunArgs) -> Result<i32> {
    // Credentials are checked before anything touches the filesystem
    let credentials = if args.dry_run {
        None
    } else {
        Some(StoreCredentials::resolve(
            args.store_url.as_deref(),
            args.store_key.as_deref(),
        )?)
    };

    let settings = ReplaySettings::from_args(args)?;

    let summary = match credentials {
        Some(credentials) => {
            let store = RestTableClient::new(&credentials, settings.request_timeout)?;
            info!(url = store.base_url(), table = %settings.table, "Connected table store client");
            run_cycle(&settings, &store, &TokioWaiter).await?
        }
        None => {
            info!("Dry run: replaying into an in-memory table");
            let store = InMemoryTableStore::new();
            run_cycle(&settings, &store, &TokioWaiter).await?
        }
    };

    print_summary(&summary, args.dry_run);

    Ok(summary.exit_code())
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!();

    if summary.status == CycleStatus::AbortedEmpty {
        println!(
            "{} No data loaded from {}. Nothing was replayed.",
            "!".yellow().bold(),
            summary.source.display()
        );
        return;
    }

    let target = if dry_run {
        format!("{} (dry run)", summary.table)
    } else {
        summary.table.clone()
    };

    let mark = if summary.failed_batches() == 0 {
        "✓".green()
    } else {
        "!".yellow()
    };
    println!(
        "{} Replayed {} of {} record(s) into '{}' in {} batch(es)",
        mark,
        summary.uploaded_records(),
        summary.records_loaded,
        target,
        summary.batches.len()
    );

    for batch in &summary.batches {
        if let BatchStatus::Failed { ref reason } = batch.status {
            println!(
                "  {} batch {} ({} record(s)): {}",
                "✗".red(),
                batch.index + 1,
                batch.submitted,
                reason
            );
        }
    }

    let cleanup = &summary.cleanup;
    if cleanup.skipped {
        println!("{} Cleanup skipped: no injected records to delete", "-".dimmed());
    } else {
        let mark = if cleanup.failed_keys() == 0 {
            "✓".green()
        } else {
            "!".yellow()
        };
        println!(
            "{} Cleaned up {}/{} key(s) ({} row(s) removed)",
            mark,
            cleanup.deleted_keys(),
            summary.ledger_size,
            cleanup.rows_removed()
        );

        for outcome in cleanup.outcomes.iter().filter(|o| !o.is_success()) {
            if let KeyStatus::Failed { ref reason } = outcome.status {
                println!("  {} {}: {}", "✗".red(), outcome.key, reason);
            }
        }
    }

    let elapsed = summary.finished_at - summary.started_at;
    let status = match summary.status {
        CycleStatus::Completed => "Cycle complete".green().bold(),
        _ => "Cycle complete with failures".yellow().bold(),
    };
    println!(
        "\n{} in {:.1}s",
        status,
        elapsed.num_milliseconds() as f64 / 1000.0
    );
}
