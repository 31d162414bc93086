use gifvault_core::{GifItem, KeyValueStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::Result;

const KEY_PREFIX: &str = "item-cache:";

/// Caches re-hosted [`GifItem`]s by upstream ID, independent of the query
/// that found them.
///
/// Reads do not refresh the TTL; an entry expires a fixed time after it was
/// written.
#[derive(Debug)]
pub struct ItemCache<S> {
    store: Arc<S>,
}

impl<S> Clone for ItemCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> ItemCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn cache_key(item_id: &str) -> String {
        format!("{KEY_PREFIX}{item_id}")
    }

    /// Returns `Ok(None)` if the item has never been cached or has expired.
    pub async fn get(&self, item_id: &str) -> Result<Option<GifItem>> {
        let key = Self::cache_key(item_id);
        let Some(cached) = self.store.get(&key).await? else {
            trace!(item_id, "item cache miss");
            return Ok(None);
        };

        match serde_json::from_str::<GifItem>(&cached) {
            Ok(item) => {
                debug!(item_id, "item cache hit");
                Ok(Some(item))
            }
            Err(e) => {
                warn!(item_id, error = %e, "failed to deserialize cached item");
                Err(StoreError::InvalidData(format!(
                    "invalid cached value for key '{key}': {e}"
                )))
            }
        }
    }

    pub async fn put(&self, item_id: &str, item: &GifItem, ttl: Duration) -> Result<()> {
        let json = serde_json::to_string(item)
            .map_err(|e| StoreError::Serialization(format!("failed to serialize item: {e}")))?;
        self.store
            .set(&Self::cache_key(item_id), &json, Some(ttl))
            .await?;
        debug!(item_id, "cached item");
        Ok(())
    }
}
