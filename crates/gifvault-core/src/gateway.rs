use crate::error::RehostError;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, RehostError>;

/// A CDN that mirrors remote media under its own durable domain.
#[async_trait]
pub trait RehostGateway: Send + Sync + 'static {
    /// Asks the CDN to fetch `source_url` and returns the candidate CDN URL.
    ///
    /// The returned URL is not guaranteed to be reachable yet; see
    /// [`exists`](RehostGateway::exists).
    async fn upload(&self, source_url: &str, media_type: &str) -> Result<String>;

    /// Issues a lightweight existence check against `url`.
    async fn exists(&self, url: &str) -> Result<bool>;
}
