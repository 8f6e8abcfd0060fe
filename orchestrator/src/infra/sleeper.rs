//! Infrastructure implementation of the `Sleeper` port.

use std::time::Duration;

use crate::application::ports::Sleeper;

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
