use gifvault_core::UpstreamError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("query is empty")]
    EmptyQuery,
    #[error("upstream search failed: {0}")]
    Upstream(
        #[from]
        #[source]
        UpstreamError,
    ),
}
