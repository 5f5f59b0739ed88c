//! Table store access
//!
//! [`TableStore`] is the seam between the replay stages and the remote
//! store. [`RestTableClient`] speaks the PostgREST dialect served by Supabase;
//! [`InMemoryTableStore`] backs dry runs and tests.

pub mod client;
pub mod endpoints;
pub mod memory;
pub mod types;

pub use client::RestTableClient;
pub use memory::{InMemoryTableStore, StoreCall};
pub use types::*;

use crate::error::Result;
use async_trait::async_trait;
use livesim_common::types::Record;

/// Table-oriented store (dependency injection seam)
///
/// Each call is applied independently; there is no transaction spanning
/// calls.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Insert `records` into `table` in one call
    async fn insert(&self, table: &str, records: &[Record]) -> Result<InsertResponse>;

    /// Delete the rows of `table` matching every filter (AND)
    async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<DeleteResponse>;
}
