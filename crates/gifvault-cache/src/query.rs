use gifvault_core::{GifItem, KeyValueStore, SearchResultSet, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::Result;

const KEY_PREFIX: &str = "query-cache:";

/// Normalizes a query for use as a cache key: trimmed, lowercased, inner
/// whitespace collapsed to single spaces.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Caches the final accepted result list per query string.
///
/// An entry only satisfies requests for at most as many items as it holds;
/// a set cached for a smaller request is a miss for a larger one.
#[derive(Debug)]
pub struct QueryCache<S> {
    store: Arc<S>,
}

impl<S> Clone for QueryCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> QueryCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn cache_key(query: &str) -> String {
        format!("{KEY_PREFIX}{}", normalize_query(query))
    }

    /// Returns the cached set truncated to `count`, or `None` if nothing is
    /// cached or the cached set holds fewer than `count` items.
    pub async fn get(&self, query: &str, count: usize) -> Result<Option<SearchResultSet>> {
        let Some(mut cached) = self.get_any(query).await? else {
            return Ok(None);
        };

        if cached.len() < count {
            debug!(
                query,
                cached = cached.len(),
                requested = count,
                "query cache entry too small"
            );
            return Ok(None);
        }

        cached.items.truncate(count);
        Ok(Some(cached))
    }

    /// Returns whatever is cached for `query`, regardless of its size.
    pub async fn get_any(&self, query: &str) -> Result<Option<SearchResultSet>> {
        let key = Self::cache_key(query);
        let Some(cached) = self.store.get(&key).await? else {
            trace!(query, "query cache miss");
            return Ok(None);
        };

        let items = serde_json::from_str::<Vec<GifItem>>(&cached).map_err(|e| {
            warn!(query, error = %e, "failed to deserialize cached result set");
            StoreError::InvalidData(format!("invalid cached value for key '{key}': {e}"))
        })?;

        debug!(query, items = items.len(), "query cache hit");
        Ok(Some(SearchResultSet::new(query, items)))
    }

    /// Overwrites the cached result list for `query`.
    pub async fn put(&self, query: &str, items: &[GifItem], ttl: Duration) -> Result<()> {
        let key = Self::cache_key(query);
        let json = serde_json::to_string(items).map_err(|e| {
            StoreError::Serialization(format!("failed to serialize result set: {e}"))
        })?;

        self.store.set(&key, &json, Some(ttl)).await?;
        // The entry already carries its TTL; a failed refresh leaves it intact.
        if let Err(e) = self.store.expire(&key, ttl).await {
            warn!(query, error = %e, "failed to refresh query cache expiry");
        }
        debug!(query, items = items.len(), "cached result set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use jiff::Timestamp;
    use std::collections::BTreeMap;

    const TTL: Duration = Duration::from_secs(60);

    fn items(n: usize) -> Vec<GifItem> {
        (0..n)
            .map(|i| GifItem {
                id: i.to_string(),
                title: String::new(),
                media: BTreeMap::new(),
                content_description: String::new(),
                created: Timestamp::UNIX_EPOCH,
                has_audio: false,
                url: format!("https://cdn.test/{i}.gif"),
            })
            .collect()
    }

    fn cache() -> QueryCache<InMemoryStore> {
        QueryCache::new(Arc::new(InMemoryStore::new()))
    }

    #[test]
    fn normalize_query_collapses_case_and_whitespace() {
        assert_eq!(normalize_query("  Happy   Birthday "), "happy birthday");
    }

    #[tokio::test]
    async fn hit_when_cached_set_is_large_enough() {
        let cache = cache();
        cache.put("dance", &items(8), TTL).await.unwrap();

        let hit = cache.get("dance", 8).await.unwrap().unwrap();
        assert_eq!(hit.len(), 8);
        assert_eq!(hit.query, "dance");
    }

    #[tokio::test]
    async fn smaller_request_is_truncated() {
        let cache = cache();
        cache.put("dance", &items(8), TTL).await.unwrap();

        let hit = cache.get("dance", 3).await.unwrap().unwrap();
        assert_eq!(hit.ids(), vec!["0", "1", "2"]);
    }

    #[tokio::test]
    async fn larger_request_is_a_miss() {
        let cache = cache();
        cache.put("dance", &items(8), TTL).await.unwrap();

        assert!(cache.get("dance", 12).await.unwrap().is_none());
        assert_eq!(cache.get_any("dance").await.unwrap().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn lookup_is_case_and_whitespace_insensitive() {
        let cache = cache();
        cache.put("Thumbs Up", &items(2), TTL).await.unwrap();

        assert!(cache.get(" thumbs   up", 2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn put_overwrites_previous_set() {
        let cache = cache();
        cache.put("dance", &items(8), TTL).await.unwrap();
        cache.put("dance", &items(2), TTL).await.unwrap();

        assert!(cache.get("dance", 8).await.unwrap().is_none());
        assert_eq!(cache.get("dance", 2).await.unwrap().unwrap().len(), 2);
    }

    /// Delegates to an [`InMemoryStore`] but fails every `expire`.
    #[derive(Default)]
    struct NoExpireStore {
        inner: InMemoryStore,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for NoExpireStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
            self.inner.set(key, value, ttl).await
        }

        async fn expire(&self, _key: &str, _ttl: Duration) -> Result<bool> {
            Err(StoreError::Timeout("expire timed out".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_expiry_refresh_still_leaves_a_ttl() {
        let cache = QueryCache::new(Arc::new(NoExpireStore::default()));
        cache
            .put("dance", &items(2), Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(cache.get_any("dance").await.unwrap().unwrap().len(), 2);

        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get_any("dance").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entry_expires_with_ttl() {
        let cache = cache();
        cache
            .put("dance", &items(1), Duration::from_millis(20))
            .await
            .unwrap();
        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get_any("dance").await.unwrap().is_none());
    }
}
