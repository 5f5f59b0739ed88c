//! livesim Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the livesim workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`LivesimError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup shared by every binary
//! - **Types**: [`Record`](types::Record) and [`IdentityKey`](types::IdentityKey),
//!   the row and row-address types that flow through a replay cycle
//!
//! # Example
//!
//! ```no_run
//! use livesim_common::types::{IdentityKey, Record};
//!
//! fn key_of(record: &Record) -> livesim_common::Result<IdentityKey> {
//!     IdentityKey::from_record(record)
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{LivesimError, Result};
