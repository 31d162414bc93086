use gifvault_cache::{ItemCache, KeyValueStore, QueryCache};
use gifvault_core::{
    Clock, RehostGateway, RetryPolicy, SearchResultSet, TokioClock, UpstreamSearch,
};
use gifvault_rehost::Rehoster;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::collector::Collector;
use crate::error::{Result, SearchError};
use crate::orchestrator::BatchOrchestrator;
use crate::settings::SearchSettings;

/// Entry point for consumers: deduplicated, CDN-hosted GIFs for one query
/// or many.
///
/// All components share the single store handle passed in at construction.
pub struct GifSearchService<U, G, S, C = TokioClock> {
    collector: Collector<U, G, S, C>,
    queries: QueryCache<S>,
    settings: Arc<SearchSettings>,
}

impl<U, G, S> GifSearchService<U, G, S, TokioClock>
where
    U: UpstreamSearch,
    G: RehostGateway,
    S: KeyValueStore,
{
    pub fn new(upstream: Arc<U>, gateway: Arc<G>, store: Arc<S>, settings: SearchSettings) -> Self {
        Self::with_clock(upstream, gateway, store, Arc::new(TokioClock), settings)
    }
}

impl<U, G, S, C> GifSearchService<U, G, S, C>
where
    U: UpstreamSearch,
    G: RehostGateway,
    S: KeyValueStore,
    C: Clock,
{
    pub fn with_clock(
        upstream: Arc<U>,
        gateway: Arc<G>,
        store: Arc<S>,
        clock: Arc<C>,
        settings: SearchSettings,
    ) -> Self {
        let settings = Arc::new(settings);
        let rehoster = Rehoster::with_clock(gateway, clock, settings.cdn_prefix.clone());
        let collector = Collector::new(
            upstream,
            rehoster,
            ItemCache::new(Arc::clone(&store)),
            Arc::clone(&settings),
        );
        Self {
            collector,
            queries: QueryCache::new(store),
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Returns up to `count` distinct GIFs for `query`.
    ///
    /// Served from the query cache when a large enough set is cached;
    /// otherwise collected fresh and cached. Fails only if the upstream
    /// search fails.
    pub async fn search(&self, query: &str, count: usize) -> Result<SearchResultSet> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        if let Some(cached) = self.cached(query, count).await {
            return Ok(cached);
        }
        self.collect_fresh(query, count, &self.settings.verify_policy)
            .await
    }

    /// Returns up to `count` distinct GIFs for each distinct, non-blank
    /// query. Never fails; see [`BatchOrchestrator`].
    pub async fn search_many<Q>(&self, queries: Q, count: usize) -> BTreeMap<String, SearchResultSet>
    where
        Q: IntoIterator,
        Q::Item: AsRef<str>,
    {
        BatchOrchestrator::new(self).run(queries, count).await
    }

    /// Cached set holding at least `count` items, if any. Store errors count
    /// as a miss.
    pub(crate) async fn cached(&self, query: &str, count: usize) -> Option<SearchResultSet> {
        match self.queries.get(query, count).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(query, error = %e, "query cache read failed, collecting live");
                None
            }
        }
    }

    /// Whatever is cached for `query` (at most `count` items), or an empty set.
    pub(crate) async fn cached_or_empty(&self, query: &str, count: usize) -> SearchResultSet {
        match self.queries.get_any(query).await {
            Ok(Some(mut cached)) => {
                cached.items.truncate(count);
                cached
            }
            Ok(None) => SearchResultSet::empty(query),
            Err(e) => {
                warn!(query, error = %e, "query cache read failed");
                SearchResultSet::empty(query)
            }
        }
    }

    /// Runs the collector and overwrites the query cache with the result.
    pub(crate) async fn collect_fresh(
        &self,
        query: &str,
        count: usize,
        policy: &RetryPolicy,
    ) -> Result<SearchResultSet> {
        let items = self.collector.collect(query, count, policy).await?;

        if let Err(e) = self.queries.put(query, &items, self.settings.query_ttl).await {
            warn!(query, error = %e, "query cache write failed");
        } else {
            debug!(query, items = items.len(), "query cache refreshed");
        }
        Ok(SearchResultSet::new(query, items))
    }
}
