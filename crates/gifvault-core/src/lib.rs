//! Core types and traits for gifvault.
//!
//! This crate provides the GIF data model, the similarity heuristic used to
//! deduplicate results, and the traits implemented by the durable store, the
//! upstream search client and the CDN re-hosting gateway.

pub mod clock;
pub mod error;
pub mod gateway;
pub mod metadata;
pub mod model;
pub mod retry;
pub mod similarity;
pub mod store;
pub mod upstream;

pub use clock::{Clock, TokioClock};
pub use error::{RehostError, StoreError, UpstreamError};
pub use gateway::RehostGateway;
pub use metadata::GifMetadata;
pub use model::{formats, GifItem, MediaRendition, SearchResultSet};
pub use retry::RetryPolicy;
pub use similarity::{similarity_score, SimilarityIndex, DUPLICATE_THRESHOLD};
pub use store::KeyValueStore;
pub use upstream::{ContentFilter, SearchPage, SearchRequest, UpstreamSearch};
