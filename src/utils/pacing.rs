// src/utils/pacing.rs

//! Request pacing against the source site.
//!
//! The delay lives behind a trait so pipeline tests run without real
//! wall-clock sleeps.

use std::time::Duration;

use async_trait::async_trait;

/// A pause taken between consecutive program requests.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Fixed-interval pacer backed by the tokio timer.
pub struct IntervalPacer {
    delay: Duration,
}

impl IntervalPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Pacer configured from a millisecond delay.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Pacer that does not wait. Used in tests.
pub struct NoopPacer;

#[async_trait]
impl Pacer for NoopPacer {
    async fn pause(&self) {}
}
