//! livesim CLI Library
//!
//! Replays a static dataset into a remote table store as if it were a live
//! feed, then retracts what it injected.
//!
//! # Overview
//!
//! One cycle runs three stages in strict order:
//!
//! - **Loader** ([`loader`]): read the CSV, normalize headers, check the
//!   identity columns
//! - **Injector** ([`injector`]): upload fixed-size batches with a pause
//!   between them, recording an [`InjectionLedger`](injector::InjectionLedger)
//! - **Cleaner** ([`cleaner`]): after a final pause, delete each ledger entry
//!
//! [`orchestrator::run_cycle`] sequences the stages against any
//! [`TableStore`](store::TableStore) and [`Waiter`](pacing::Waiter), so
//! tests can drive a full cycle with an in-memory table and a virtual clock.

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod cleaner;
pub mod commands;
pub mod config;
pub mod error;
pub mod injector;
pub mod loader;
pub mod orchestrator;
pub mod pacing;
pub mod store;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use orchestrator::{run_cycle, RunSummary};

use clap::{Args, Parser, Subcommand};
use config::{
    DEFAULT_BATCH_DELAY_SECS, DEFAULT_BATCH_SIZE, DEFAULT_CLEANUP_DELAY_SECS, DEFAULT_INPUT_PATH,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TABLE,
};
use std::path::PathBuf;

/// livesim - replay a static dataset as a live feed
#[derive(Parser, Debug)]
#[command(name = "livesim")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one injection and cleanup cycle
    Run(RunArgs),

    /// Load and validate a dataset without contacting the store
    Inspect {
        /// Input CSV file
        #[arg(short, long, env = "LIVESIM_INPUT", default_value = DEFAULT_INPUT_PATH)]
        input: PathBuf,
    },
}

/// Options for `livesim run`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Table store URL
    #[arg(long, env = "SUPABASE_URL", hide_env_values = true)]
    pub store_url: Option<String>,

    /// Table store access key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Target table
    #[arg(short, long, env = "LIVESIM_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Input CSV file
    #[arg(short, long, env = "LIVESIM_INPUT", default_value = DEFAULT_INPUT_PATH)]
    pub input: PathBuf,

    /// Records per upload call
    #[arg(short, long, env = "LIVESIM_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Seconds to wait between batches
    #[arg(long, env = "LIVESIM_BATCH_DELAY_SECS", default_value_t = DEFAULT_BATCH_DELAY_SECS)]
    pub batch_delay_secs: u64,

    /// Seconds to wait after the last batch before cleanup
    #[arg(long, env = "LIVESIM_CLEANUP_DELAY_SECS", default_value_t = DEFAULT_CLEANUP_DELAY_SECS)]
    pub cleanup_delay_secs: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "LIVESIM_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Replay into an in-memory table instead of the remote store
    #[arg(long)]
    pub dry_run: bool,
}
