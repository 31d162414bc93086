use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("store operation timed out: {0}")]
    Timeout(String),
    #[error("store serialization failed: {0}")]
    Serialization(String),
    #[error("stored value is invalid: {0}")]
    InvalidData(String),
    #[error("store operation failed: {0}")]
    Operation(String),
}

/// Errors raised by the upstream search provider.
///
/// Any of these is fatal for the collection attempt of the query that
/// triggered it; there is no partial page to fall back on.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Error)]
pub enum RehostError {
    #[error("cdn upload failed: {0}")]
    Upload(String),
    #[error("cdn upload timed out")]
    UploadTimeout,
    #[error("cdn existence check failed: {0}")]
    Verify(String),
    #[error("item has no '{0}' rendition to re-host")]
    MissingRendition(String),
    #[error("invalid source url: {0}")]
    InvalidSourceUrl(String),
}
