//! Error types for the livesim CLI
//!
//! Every variant here is fatal for a run. Per-batch and per-key failures
//! during injection and cleanup are reported as outcomes, not errors.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code for a fatal configuration, load, or client error
pub const EXIT_FATAL: i32 = 1;

/// User-facing error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// A required credential was not provided
    #[error("Missing credential: {0} is not set. Export it or add it to a .env file.")]
    MissingCredential(&'static str),

    /// Configuration value is present but unusable
    #[error("Configuration error: {0}. Check your flags and environment variables.")]
    InvalidConfig(String),

    /// Input dataset is missing
    #[error("File not found: '{0}'. Verify the input path exists and you have read permissions.")]
    FileNotFound(String),

    /// A required column is absent after header normalization
    #[error("Required column '{column}' not found after cleaning headers (have: {}). Check your CSV header.", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Two headers collapsed to the same normalized name
    #[error("Columns '{first}' and '{second}' both normalize to '{normalized}'. Rename one of them.")]
    DuplicateColumn {
        first: String,
        second: String,
        normalized: String,
    },

    /// Input could not be parsed as delimited text
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Table store rejected a request
    #[error("Table store returned {status}: {message}")]
    Store { status: u16, message: String },

    /// HTTP request failed before a response arrived
    #[error("Network request failed: {0}. Check your internet connection and store URL.")]
    Http(#[from] reqwest::Error),

    /// File system operation failed
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Failure raised by shared livesim code, e.g. a bad `LOG_*` variable
    #[error(transparent)]
    Common(#[from] livesim_common::LivesimError),
}

impl CliError {
    /// Create an invalid configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a table store error
    pub fn store(status: u16, msg: impl Into<String>) -> Self {
        Self::Store {
            status,
            message: msg.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        EXIT_FATAL
    }
}
