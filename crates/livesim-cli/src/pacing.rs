//! Pacing delays
//!
//! The replay pauses between batches and before cleanup so a polling
//! dashboard can observe each intermediate state. Those pauses go through
//! [`Waiter`] so tests can swap wall-clock sleeps for a [`VirtualClock`].

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[async_trait]
pub trait Waiter: Send + Sync {
    /// Suspend the cycle for `duration`. Not cancellable.
    async fn wait(&self, duration: Duration);
}

/// Real timed wait on the Tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioWaiter;

#[async_trait]
impl Waiter for TokioWaiter {
    async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Records requested waits and advances a virtual elapsed time instead of
/// sleeping
#[derive(Debug, Default)]
pub struct VirtualClock {
    waits: Mutex<Vec<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every wait requested so far, in order
    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total simulated time
    pub fn elapsed(&self) -> Duration {
        self.waits().iter().sum()
    }
}

#[async_trait]
impl Waiter for VirtualClock {
    async fn wait(&self, duration: Duration) {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}
