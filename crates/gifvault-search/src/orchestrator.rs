use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use gifvault_cache::{normalize_query, KeyValueStore};
use gifvault_core::{Clock, RehostGateway, SearchResultSet, UpstreamSearch};
use std::collections::{BTreeMap, HashSet};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::service::GifSearchService;

/// Trims, drops blanks and removes queries that normalize to the same cache
/// key, keeping the first spelling.
pub fn distinct_queries<Q>(queries: Q) -> Vec<String>
where
    Q: IntoIterator,
    Q::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    queries
        .into_iter()
        .map(|query| query.as_ref().trim().to_string())
        .filter(|query| !query.is_empty())
        .filter(|query| seen.insert(normalize_query(query)))
        .collect()
}

/// Fans the single-query pipeline out over many queries at once.
///
/// Queries with a large enough cached set are answered from cache; the rest
/// are collected concurrently with the batch verification policy. Cache
/// lookups and collection share one deadline. Queries still unanswered when
/// it passes get whatever the query cache holds at that moment, or an empty
/// set; those last reads are bounded by
/// [`fallback_read_timeout`](crate::SearchSettings::fallback_read_timeout).
/// A query whose collection fails is answered with an empty set.
pub struct BatchOrchestrator<'a, U, G, S, C> {
    service: &'a GifSearchService<U, G, S, C>,
}

impl<'a, U, G, S, C> BatchOrchestrator<'a, U, G, S, C>
where
    U: UpstreamSearch,
    G: RehostGateway,
    S: KeyValueStore,
    C: Clock,
{
    pub fn new(service: &'a GifSearchService<U, G, S, C>) -> Self {
        Self { service }
    }

    pub async fn run<Q>(&self, queries: Q, count: usize) -> BTreeMap<String, SearchResultSet>
    where
        Q: IntoIterator,
        Q::Item: AsRef<str>,
    {
        let settings = self.service.settings();
        let queries = distinct_queries(queries);
        let mut answered = BTreeMap::new();
        if queries.is_empty() {
            return answered;
        }

        let deadline = Instant::now() + settings.batch_timeout;
        let finished =
            tokio::time::timeout_at(deadline, self.answer_all(&queries, count, &mut answered))
                .await
                .is_ok();
        if finished {
            return answered;
        }

        let unanswered: Vec<&String> = queries
            .iter()
            .filter(|query| !answered.contains_key(*query))
            .collect();
        warn!(
            timeout = ?settings.batch_timeout,
            unanswered = unanswered.len(),
            "batch search timed out, answering from cache"
        );

        let fallbacks = join_all(unanswered.into_iter().map(|query| async move {
            let set = tokio::time::timeout(
                settings.fallback_read_timeout,
                self.service.cached_or_empty(query, count),
            )
            .await
            .unwrap_or_else(|_| {
                warn!(query = %query, "query cache read timed out");
                SearchResultSet::empty(query.as_str())
            });
            (query.clone(), set)
        }))
        .await;
        answered.extend(fallbacks);
        answered
    }

    /// Answers every query, recording each result as soon as it is known so
    /// the caller keeps them if the deadline cuts this short.
    async fn answer_all(
        &self,
        queries: &[String],
        count: usize,
        answered: &mut BTreeMap<String, SearchResultSet>,
    ) {
        let lookups = join_all(
            queries
                .iter()
                .map(|query| async move { (query, self.service.cached(query, count).await) }),
        )
        .await;

        let mut pending = Vec::new();
        for (query, hit) in lookups {
            match hit {
                Some(cached) => {
                    answered.insert(query.clone(), cached);
                }
                None => pending.push(query),
            }
        }
        info!(
            cached = answered.len(),
            pending = pending.len(),
            "starting batch search"
        );

        let policy = self.service.settings().batch_verify_policy;
        let mut collecting = pending
            .into_iter()
            .map(|query| async move {
                let outcome = self.service.collect_fresh(query, count, &policy).await;
                (query, outcome)
            })
            .collect::<FuturesUnordered<_>>();

        while let Some((query, outcome)) = collecting.next().await {
            let set = outcome.unwrap_or_else(|e| {
                warn!(query = %query, error = %e, "collection failed");
                SearchResultSet::empty(query.as_str())
            });
            answered.insert(query.clone(), set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        distinct_gifs, page, settings, FakeGateway, FakeUpstream, InstantClock, StallingStore,
        UnavailableStore,
    };
    use gifvault_cache::{InMemoryStore, QueryCache};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    fn service(
        upstream: &Arc<FakeUpstream>,
        store: &Arc<InMemoryStore>,
    ) -> GifSearchService<FakeUpstream, FakeGateway, InMemoryStore, InstantClock> {
        GifSearchService::with_clock(
            Arc::clone(upstream),
            FakeGateway::new(),
            Arc::clone(store),
            Arc::new(InstantClock),
            settings(),
        )
    }

    #[test]
    fn distinct_queries_trims_drops_blanks_and_duplicates() {
        let queries = distinct_queries(["  Dance ", "", "dance", "   ", "Cat", "CAT  "]);
        assert_eq!(queries, vec!["Dance".to_string(), "Cat".to_string()]);
    }

    #[tokio::test]
    async fn collects_only_unsatisfied_queries() {
        let upstream = FakeUpstream::repeating(page(distinct_gifs(3), None));
        let store = Arc::new(InMemoryStore::new());
        let seeded = service(&upstream, &store).search("cached", 3).await.unwrap();
        assert_eq!(upstream.calls(), 1);

        let results = service(&upstream, &store)
            .search_many(["cached", "fresh"], 3)
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results["cached"].ids(), seeded.ids());
        assert_eq!(results["fresh"].len(), 3);
        assert_eq!(upstream.calls(), 2);
        assert_eq!(upstream.requests()[1].query, "fresh");
    }

    #[tokio::test]
    async fn failed_collection_yields_empty_set() {
        let upstream = FakeUpstream::failing();
        let store = Arc::new(InMemoryStore::new());

        let results = service(&upstream, &store)
            .search_many(vec!["a".to_string(), "b".to_string()], 3)
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.values().all(SearchResultSet::is_empty));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_answers_from_cache_or_empty() {
        let upstream = FakeUpstream::repeating_except(page(distinct_gifs(3), None), "slow");
        let store = Arc::new(InMemoryStore::new());

        // an undersized entry for "slow" from an earlier, smaller request
        QueryCache::new(Arc::clone(&store))
            .put("slow", &distinct_gifs(1), Duration::from_secs(60))
            .await
            .unwrap();

        let results = service(&upstream, &store)
            .search_many(["fast", "slow", "quick"], 3)
            .await;

        assert_eq!(results["fast"].len(), 3);
        assert_eq!(results["slow"].len(), 1);
        assert_eq!(results["quick"].len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_with_nothing_cached_returns_empty_sets() {
        let upstream = FakeUpstream::repeating_except(page(distinct_gifs(3), None), "slow");
        let store = Arc::new(InMemoryStore::new());

        let results = service(&upstream, &store).search_many(["slow"], 3).await;

        assert_eq!(results.len(), 1);
        assert!(results["slow"].is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_cannot_hold_the_batch_past_its_deadline() {
        let upstream = FakeUpstream::repeating(page(distinct_gifs(3), None));
        let service = GifSearchService::with_clock(
            Arc::clone(&upstream),
            FakeGateway::new(),
            Arc::new(StallingStore),
            Arc::new(InstantClock),
            settings(),
        );
        let budget = service.settings().batch_timeout + service.settings().fallback_read_timeout;

        let started = tokio::time::Instant::now();
        let results = service.search_many(["dance", "cat"], 3).await;

        // timer wheel granularity may add a millisecond per deadline
        let elapsed = started.elapsed();
        assert!(elapsed < budget + Duration::from_millis(100), "took {elapsed:?}");
        assert_eq!(results.len(), 2);
        assert!(results.values().all(SearchResultSet::is_empty));
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn batch_verifies_with_three_attempts_per_item() {
        let upstream = FakeUpstream::with_pages(vec![page(distinct_gifs(1), None)]);
        let gateway = FakeGateway::invisible();
        let store = Arc::new(InMemoryStore::new());
        let service = GifSearchService::with_clock(
            Arc::clone(&upstream),
            Arc::clone(&gateway),
            store,
            Arc::new(InstantClock),
            settings(),
        );

        let results = service.search_many(["dance"], 1).await;

        assert!(results["dance"].is_empty());
        assert_eq!(gateway.exists_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn batch_survives_an_unavailable_store() {
        let upstream = FakeUpstream::repeating(page(distinct_gifs(3), None));
        let service = GifSearchService::with_clock(
            Arc::clone(&upstream),
            FakeGateway::new(),
            Arc::new(UnavailableStore),
            Arc::new(InstantClock),
            settings(),
        );

        let results = service.search_many(["dance", "cat"], 2).await;

        assert_eq!(results["dance"].len(), 2);
        assert_eq!(results["cat"].len(), 2);
    }

    #[tokio::test]
    async fn all_blank_input_does_nothing() {
        let upstream = FakeUpstream::failing();
        let store = Arc::new(InMemoryStore::new());

        let results = service(&upstream, &store).search_many(["", "  "], 3).await;

        assert!(results.is_empty());
        assert_eq!(upstream.calls(), 0);
    }
}
