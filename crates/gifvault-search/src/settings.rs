use gifvault_core::RetryPolicy;
use std::time::Duration;
use typed_builder::TypedBuilder;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Tuning for the collection pipeline.
///
/// ```rust
/// use gifvault_search::SearchSettings;
///
/// let settings = SearchSettings::builder()
///     .cdn_prefix("https://cdn.example.com/".to_string())
///     .build();
/// assert_eq!(settings.max_pages, 10);
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct SearchSettings {
    /// URL prefix every served item must live under.
    pub cdn_prefix: String,
    /// Items requested per upstream page.
    #[builder(default = 50)]
    pub page_size: u32,
    /// Upper bound on upstream pages fetched for one query.
    #[builder(default = 10)]
    pub max_pages: usize,
    /// Items re-hosted concurrently within a page.
    #[builder(default = 12)]
    pub batch_size: usize,
    #[builder(default = DAY)]
    pub item_ttl: Duration,
    #[builder(default = DAY)]
    pub query_ttl: Duration,
    /// Wall-clock budget for one [`search_many`] call.
    ///
    /// [`search_many`]: crate::GifSearchService::search_many
    #[builder(default = Duration::from_secs(50))]
    pub batch_timeout: Duration,
    /// Bound on the query cache reads that answer a batch after its
    /// deadline has passed.
    #[builder(default = Duration::from_secs(1))]
    pub fallback_read_timeout: Duration,
    /// Verification policy for single-query searches.
    #[builder(default)]
    pub verify_policy: RetryPolicy,
    /// Verification policy for batch searches.
    #[builder(default = RetryPolicy::batch())]
    pub batch_verify_policy: RetryPolicy,
}
