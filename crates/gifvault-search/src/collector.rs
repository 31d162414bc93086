use futures::future::join_all;
use gifvault_cache::{ItemCache, KeyValueStore};
use gifvault_core::{
    Clock, GifItem, GifMetadata, RehostGateway, RetryPolicy, SearchRequest, SimilarityIndex,
    TokioClock, UpstreamSearch,
};
use gifvault_rehost::Rehoster;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::settings::SearchSettings;

/// Drives upstream pagination for one query until enough distinct,
/// re-hosted items have been accepted or the page budget runs out.
///
/// Items of a page are prepared (item cache lookup, re-hosting) in
/// concurrent batches, but acceptance is decided one item at a time in
/// upstream order, so identical upstream responses always yield the same
/// result.
pub struct Collector<U, G, S, C = TokioClock> {
    upstream: Arc<U>,
    rehoster: Rehoster<G, C>,
    items: ItemCache<S>,
    settings: Arc<SearchSettings>,
}

impl<U, G, S, C> Clone for Collector<U, G, S, C> {
    fn clone(&self) -> Self {
        Self {
            upstream: Arc::clone(&self.upstream),
            rehoster: self.rehoster.clone(),
            items: self.items.clone(),
            settings: Arc::clone(&self.settings),
        }
    }
}

/// Items accepted so far for one query, plus the metadata used to reject
/// near-duplicates of them.
#[derive(Default)]
struct Accepted {
    items: Vec<GifItem>,
    index: SimilarityIndex,
}

impl Accepted {
    fn len(&self) -> usize {
        self.items.len()
    }
}

impl<U, G, S, C> Collector<U, G, S, C>
where
    U: UpstreamSearch,
    G: RehostGateway,
    S: KeyValueStore,
    C: Clock,
{
    pub fn new(
        upstream: Arc<U>,
        rehoster: Rehoster<G, C>,
        items: ItemCache<S>,
        settings: Arc<SearchSettings>,
    ) -> Self {
        Self {
            upstream,
            rehoster,
            items,
            settings,
        }
    }

    /// Collects up to `desired` accepted items for `query`.
    ///
    /// The result may hold fewer items when the upstream runs dry or the
    /// page budget is spent. Only an upstream failure is an error.
    pub async fn collect(
        &self,
        query: &str,
        desired: usize,
        policy: &RetryPolicy,
    ) -> Result<Vec<GifItem>> {
        let mut accepted = Accepted::default();
        let mut cursor = None;
        let mut pages = 0;

        while accepted.len() < desired && pages < self.settings.max_pages {
            let request = SearchRequest {
                query: query.to_string(),
                limit: self.settings.page_size,
                cursor: cursor.take(),
            };
            let page = self.upstream.search(&request).await?;
            pages += 1;
            debug!(query, page = pages, items = page.items.len(), "processing upstream page");

            let mut remaining = page.items.into_iter();
            while accepted.len() < desired {
                let batch: Vec<GifItem> = remaining
                    .by_ref()
                    .take(self.settings.batch_size.max(1))
                    .collect();
                if batch.is_empty() {
                    break;
                }

                let prepared = join_all(batch.into_iter().map(|item| self.prepare(item, policy))).await;
                for item in prepared {
                    self.consider(item, &mut accepted);
                    if accepted.len() == desired {
                        break;
                    }
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    debug!(query, page = pages, "upstream has no more pages");
                    break;
                }
            }
        }

        info!(
            query,
            accepted = accepted.len(),
            desired,
            pages,
            "collection finished"
        );
        Ok(accepted.items)
    }

    /// Resolves one upstream item to its re-hosted form, reusing the item
    /// cache when possible.
    async fn prepare(&self, item: GifItem, policy: &RetryPolicy) -> GifItem {
        match self.items.get(&item.id).await {
            Ok(Some(cached)) => return cached,
            Ok(None) => {}
            Err(e) => warn!(item_id = %item.id, error = %e, "item cache read failed"),
        }

        let mut item = item;
        item.fill_missing_formats();
        let processed = self.rehoster.process(item, policy).await;

        if processed.is_hosted_on(&self.settings.cdn_prefix) {
            if let Err(e) = self
                .items
                .put(&processed.id, &processed, self.settings.item_ttl)
                .await
            {
                warn!(item_id = %processed.id, error = %e, "item cache write failed");
            }
        }
        processed
    }

    fn consider(&self, item: GifItem, accepted: &mut Accepted) {
        if !item.is_hosted_on(&self.settings.cdn_prefix) {
            trace!(item_id = %item.id, "rejected: not hosted on CDN");
            return;
        }
        if accepted.index.contains(&item.id) {
            trace!(item_id = %item.id, "rejected: already accepted");
            return;
        }

        let metadata = GifMetadata::from_item(&item);
        if let Some(existing) = accepted.index.find_duplicate(&metadata) {
            debug!(item_id = %item.id, duplicate_of = existing, "rejected: near-duplicate");
            return;
        }

        accepted.index.insert(item.id.clone(), metadata);
        accepted.items.push(item);
    }
}
