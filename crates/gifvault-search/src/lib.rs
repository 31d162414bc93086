//! The GIF search pipeline: paginated upstream search, CDN re-hosting,
//! near-duplicate rejection and cached results.
//!
//! [`GifSearchService`] is the entry point. It answers a single query with
//! [`search`](GifSearchService::search) and many queries under one deadline
//! with [`search_many`](GifSearchService::search_many).

pub mod collector;
pub mod error;
pub mod orchestrator;
pub mod service;
pub mod settings;

#[cfg(test)]
mod testing;

pub use collector::Collector;
pub use error::{Result, SearchError};
pub use orchestrator::BatchOrchestrator;
pub use service::GifSearchService;
pub use settings::SearchSettings;
