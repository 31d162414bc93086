use crate::error::UpstreamError;
use crate::model::GifItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Content-safety level requested from the upstream provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFilter {
    Off,
    Low,
    #[default]
    Medium,
    High,
}

impl ContentFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFilter::Off => "off",
            ContentFilter::Low => "low",
            ContentFilter::Medium => "medium",
            ContentFilter::High => "high",
        }
    }
}

impl Display for ContentFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page request against the upstream search API.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
    /// Continuation token from the previous page, if any.
    pub cursor: Option<String>,
}

/// One page of upstream results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub items: Vec<GifItem>,
    /// Token for the next page. `None` when the upstream has no more results.
    pub next_cursor: Option<String>,
}

/// The third-party GIF search provider.
///
/// Implementations hold their own credentials and content-filter level.
#[async_trait]
pub trait UpstreamSearch: Send + Sync + 'static {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;
}
