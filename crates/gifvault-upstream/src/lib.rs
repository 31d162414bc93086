//! HTTP client for the upstream GIF search provider (Tenor v2 API).

pub mod client;
pub mod config;
mod response;

pub use client::TenorClient;
pub use config::UpstreamConfig;
