use crate::error::StoreError;
use async_trait::async_trait;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, StoreError>;

/// A durable key-value store with per-key expiry.
///
/// This is the only shared mutable resource in the pipeline. Callers
/// namespace their keys by purpose; writers to the same key are
/// last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns `Ok(None)` if the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// If `ttl` is `None` the entry does not expire until [`expire`] is
    /// called for it.
    ///
    /// [`expire`]: KeyValueStore::expire
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Sets the time-to-live of an existing key.
    ///
    /// Returns `false` if the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;
}
