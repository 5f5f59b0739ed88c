//! Configuration for a replay cycle
//!
//! Values arrive through clap (flags with environment fallbacks, see
//! [`crate::RunArgs`]) and are validated here before any file or network I/O.

use crate::error::{CliError, Result};
use crate::RunArgs;
use livesim_common::logging::{LogConfig, LogLevel};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Environment variable holding the table store URL
pub const STORE_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable holding the table store access key
pub const STORE_KEY_ENV: &str = "SUPABASE_KEY";

/// Table the dashboard polls
pub const DEFAULT_TABLE: &str = "SmartTransit_Integrated";

/// Dataset replayed when no input is given
pub const DEFAULT_INPUT_PATH: &str = "live_simulation/live_data.csv";

pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Seconds between batch uploads
pub const DEFAULT_BATCH_DELAY_SECS: u64 = 3;

/// Seconds between the last upload and cleanup, long enough for one dashboard refresh
pub const DEFAULT_CLEANUP_DELAY_SECS: u64 = 5;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Directives keeping HTTP client internals quiet at debug level
const LOG_FILTER_DIRECTIVES: &str = "hyper=warn,reqwest=warn";

/// Logging setup for the CLI: info, or debug with `--verbose`, then any
/// `LOG_*` variables from `lookup`.
///
/// An unparseable variable is an error rather than silently ignored.
pub fn log_config<F>(verbose: bool, lookup: F) -> Result<LogConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let level = if verbose { LogLevel::Debug } else { LogLevel::Info };

    let config = LogConfig::builder()
        .level(level)
        .file_prefix("livesim")
        .filter_directives(LOG_FILTER_DIRECTIVES)
        .build()
        .apply_vars(lookup)?;

    Ok(config)
}

/// Endpoint and key for the remote table store
#[derive(Clone)]
pub struct StoreCredentials {
    url: Url,
    key: String,
}

impl StoreCredentials {
    /// Validate that both credentials are present and the URL is usable.
    ///
    /// Blank values count as missing.
    pub fn resolve(url: Option<&str>, key: Option<&str>) -> Result<Self> {
        let url = present(url).ok_or(CliError::MissingCredential(STORE_URL_ENV))?;
        let key = present(key).ok_or(CliError::MissingCredential(STORE_KEY_ENV))?;

        let url = Url::parse(url)
            .map_err(|e| CliError::config(format!("{} '{}' is not a valid URL: {}", STORE_URL_ENV, url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CliError::config(format!(
                "{} must use http or https, got '{}'",
                STORE_URL_ENV,
                url.scheme()
            )));
        }

        Ok(Self {
            url,
            key: key.to_string(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("url", &self.url.as_str())
            .field("key", &"<redacted>")
            .finish()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Batch size and the two pacing delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub cleanup_delay: Duration,
}

impl Pacing {
    pub fn new(batch_size: usize, batch_delay: Duration, cleanup_delay: Duration) -> Result<Self> {
        if batch_size == 0 {
            return Err(CliError::config("batch size must be at least 1"));
        }

        Ok(Self {
            batch_size,
            batch_delay,
            cleanup_delay,
        })
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_secs(DEFAULT_BATCH_DELAY_SECS),
            cleanup_delay: Duration::from_secs(DEFAULT_CLEANUP_DELAY_SECS),
        }
    }
}

/// Everything a cycle needs apart from the store itself
#[derive(Debug, Clone)]
pub struct ReplaySettings {
    pub table: String,
    pub input: PathBuf,
    pub pacing: Pacing,
    pub request_timeout: Duration,
}

impl ReplaySettings {
    pub fn new(table: impl Into<String>, input: impl Into<PathBuf>) -> Self {
        Self {
            table: table.into(),
            input: input.into(),
            pacing: Pacing::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Build settings from parsed `run` arguments
    pub fn from_args(args: &RunArgs) -> Result<Self> {
        let table = args.table.trim();
        if table.is_empty() {
            return Err(CliError::config("table name must not be empty"));
        }

        let pacing = Pacing::new(
            args.batch_size,
            Duration::from_secs(args.batch_delay_secs),
            Duration::from_secs(args.cleanup_delay_secs),
        )?;

        Ok(Self {
            table: table.to_string(),
            input: args.input.clone(),
            pacing,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        })
    }
}
