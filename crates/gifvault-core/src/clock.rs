use async_trait::async_trait;
use std::time::Duration;

/// Source of delays between retry attempts.
///
/// Injected so retry behaviour can be tested without waiting in real time.
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Suspends the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// A [`Clock`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
