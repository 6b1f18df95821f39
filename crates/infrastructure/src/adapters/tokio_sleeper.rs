//! Sleeper implementation backed by the tokio timer.

use std::time::Duration;

use async_trait::async_trait;
use taskdeck_application::ports::Sleeper;

/// Sleeper that delegates to `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
