use clap::{Parser, ValueEnum};
use gifvault_core::ContentFilter;
use std::fmt::{Display, Formatter};

pub const STORAGE_BACKEND_ENV: &str = "GIFVAULT_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "GIFVAULT_REDIS_URL";
pub const API_KEY_ENV: &str = "GIFVAULT_API_KEY";
pub const UPSTREAM_URL_ENV: &str = "GIFVAULT_UPSTREAM_URL";
pub const CONTENT_FILTER_ENV: &str = "GIFVAULT_CONTENT_FILTER";
pub const CDN_UPLOAD_URL_ENV: &str = "GIFVAULT_CDN_UPLOAD_URL";
pub const CDN_PREFIX_ENV: &str = "GIFVAULT_CDN_PREFIX";
pub const COUNT_ENV: &str = "GIFVAULT_COUNT";
pub const JSON_LOGS_ENV: &str = "GIFVAULT_JSON_LOGS";

pub const DEFAULT_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentFilterArg {
    Off,
    Low,
    Medium,
    High,
}

impl From<ContentFilterArg> for ContentFilter {
    fn from(arg: ContentFilterArg) -> Self {
        match arg {
            ContentFilterArg::Off => ContentFilter::Off,
            ContentFilterArg::Low => ContentFilter::Low,
            ContentFilterArg::Medium => ContentFilter::Medium,
            ContentFilterArg::High => ContentFilter::High,
        }
    }
}

impl Display for ContentFilterArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        ContentFilter::from(*self).fmt(f)
    }
}

#[derive(Debug, Parser)]
#[command(name = "gifvault", about = "Search, re-host and deduplicate GIFs")]
pub struct CLI {
    /// One query runs a single search; several run as a batch.
    #[arg(required = true)]
    pub queries: Vec<String>,

    #[arg(long, short = 'n', env = COUNT_ENV, default_value_t = DEFAULT_COUNT)]
    pub count: usize,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = UPSTREAM_URL_ENV, default_value = gifvault_upstream::config::DEFAULT_BASE_URL)]
    pub upstream_url: String,

    #[arg(
        long,
        env = CONTENT_FILTER_ENV,
        value_enum,
        default_value_t = ContentFilterArg::Medium
    )]
    pub content_filter: ContentFilterArg,

    #[arg(long, env = CDN_UPLOAD_URL_ENV)]
    pub cdn_upload_url: String,

    #[arg(long, env = CDN_PREFIX_ENV)]
    pub cdn_prefix: String,

    #[arg(long, env = JSON_LOGS_ENV)]
    pub json_logs: bool,
}
