use async_trait::async_trait;
use dashmap::DashMap;
use gifvault_core::{KeyValueStore, StoreError};
use jiff::{SignedDuration, Timestamp};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::trace;

use crate::Result;

/// Every this many writes, expired entries are swept from the whole map.
const SWEEP_EVERY_WRITES: usize = 256;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expire_at: Option<Timestamp>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expire_at
            .is_some_and(|expire_at| Timestamp::now() >= expire_at)
    }
}

fn deadline(ttl: Duration) -> Result<Timestamp> {
    let ttl = SignedDuration::try_from(ttl)
        .map_err(|e| StoreError::InvalidData(format!("invalid ttl: {e}")))?;
    Timestamp::now()
        .checked_add(ttl)
        .map_err(|e| StoreError::InvalidData(format!("invalid ttl: {e}")))
}

/// In-process [`KeyValueStore`] backed by a `DashMap`.
///
/// Expired entries are dropped when they are next read, and in a periodic
/// sweep on write so keys that are never read again do not pile up.
/// Suitable for single-process deployments and tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, Entry>,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired ones included until they are dropped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        trace!(dropped = before.saturating_sub(self.entries.len()), "swept expired entries");
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };

        if value.is_none() {
            trace!(key, "dropping expired entry");
            self.entries.remove_if(key, |_, entry| entry.is_expired());
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expire_at = ttl.map(deadline).transpose()?;
        self.entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expire_at,
            },
        );

        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY_WRITES == 0 {
            self.purge_expired();
        }
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let expire_at = deadline(ttl)?;
        match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired() => {
                entry.expire_at = Some(expire_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
