use async_trait::async_trait;
use std::time::Duration;

/// Suspends the fetch loop for throttling, retry backoff and budget pauses.
#[async_trait]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
