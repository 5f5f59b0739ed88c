//! Error types shared across livesim crates

use thiserror::Error;

/// Result type alias for livesim operations
pub type Result<T> = std::result::Result<T, LivesimError>;

/// Main error type for shared livesim functionality
#[derive(Error, Debug)]
pub enum LivesimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record is missing required field '{0}'")]
    MissingField(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
