use async_trait::async_trait;
use gifvault_core::{formats, SearchPage, SearchRequest, UpstreamError, UpstreamSearch};
use reqwest::Client;
use tracing::{debug, trace, warn};

use crate::config::UpstreamConfig;
use crate::response::SearchResponse;

type Result<T> = std::result::Result<T, UpstreamError>;

fn map_reqwest_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else if err.is_decode() {
        UpstreamError::Decode(err.to_string())
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

/// Searches the Tenor v2 API.
///
/// Only the renditions the pipeline uses are requested, and every call
/// carries the configured content-safety level. The search call itself is
/// never retried.
#[derive(Debug, Clone)]
pub struct TenorClient {
    client: Client,
    config: UpstreamConfig,
}

impl TenorClient {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("gifvault/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a client reusing an existing connection pool.
    pub fn with_client(client: Client, config: UpstreamConfig) -> Self {
        Self { client, config }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl UpstreamSearch for TenorClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        trace!(query = %request.query, cursor = ?request.cursor, "searching upstream");

        let limit = request.limit.to_string();
        let media_filter = formats::REQUIRED.join(",");
        let mut params = vec![
            ("q", request.query.as_str()),
            ("key", self.config.api_key.as_str()),
            ("client_key", self.config.client_key.as_str()),
            ("limit", limit.as_str()),
            ("contentfilter", self.config.content_filter.as_str()),
            ("media_filter", media_filter.as_str()),
        ];
        if let Some(cursor) = request.cursor.as_deref() {
            params.push(("pos", cursor));
        }

        let response = self
            .client
            .get(self.search_url())
            .query(&params)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(query = %request.query, status = %status, "upstream search failed");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let page: SearchPage = response
            .json::<SearchResponse>()
            .await
            .map_err(map_reqwest_error)?
            .into();

        debug!(
            query = %request.query,
            items = page.items.len(),
            has_next = page.next_cursor.is_some(),
            "fetched upstream page"
        );
        Ok(page)
    }
}
