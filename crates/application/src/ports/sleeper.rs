//! Sleeper port for backoff delays
//!
//! This abstraction allows testing backoff schedules by recording requested
//! delays instead of actually waiting.

use std::time::Duration;

use async_trait::async_trait;

/// Port for suspending between retry attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends the current task for the given duration.
    async fn sleep(&self, duration: Duration);
}
