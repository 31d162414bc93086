use gifvault_core::ContentFilter;
use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_BASE_URL: &str = "https://tenor.googleapis.com/v2";

/// Connection settings for [`TenorClient`](crate::TenorClient).
///
/// ```rust
/// use gifvault_upstream::UpstreamConfig;
/// use gifvault_core::ContentFilter;
///
/// let config = UpstreamConfig::builder()
///     .api_key("secret".to_string())
///     .content_filter(ContentFilter::High)
///     .build();
/// assert_eq!(config.base_url, "https://tenor.googleapis.com/v2");
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct UpstreamConfig {
    #[builder(default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    pub api_key: String,
    /// Identifies the integration to the provider.
    #[builder(default = "gifvault".to_string())]
    pub client_key: String,
    #[builder(default)]
    pub content_filter: ContentFilter,
    #[builder(default = Duration::from_secs(10))]
    pub request_timeout: Duration,
}
