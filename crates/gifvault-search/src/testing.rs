//! Fakes shared by the pipeline tests.

use async_trait::async_trait;
use gifvault_core::{
    formats, Clock, GifItem, KeyValueStore, MediaRendition, RehostError, RehostGateway,
    SearchPage, SearchRequest, StoreError, UpstreamError, UpstreamSearch,
};
use jiff::Timestamp;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::settings::SearchSettings;

pub const CDN: &str = "https://cdn.gifvault.test/";
const ORIGIN: &str = "https://origin.test/";

pub fn settings() -> SearchSettings {
    SearchSettings::builder().cdn_prefix(CDN.to_string()).build()
}

/// Builds an origin-hosted item. `tag` is embedded in the source URL and
/// steers [`FakeGateway`]: `"hang"` never finishes uploading, `"foreign"`
/// is mirrored outside the CDN prefix.
pub fn gif(id: &str, tag: &str, dims: (u32, u32), duration: f64, description: &str) -> GifItem {
    let rendition = |name: &str| MediaRendition {
        url: format!("{ORIGIN}{tag}/{id}/{name}.gif"),
        width: dims.0,
        height: dims.1,
        duration_seconds: duration,
        size_bytes: 10_000,
    };
    let mut media = BTreeMap::new();
    media.insert(formats::FULL.to_string(), rendition("full"));
    media.insert(formats::THUMBNAIL.to_string(), rendition("tiny"));

    GifItem {
        id: id.to_string(),
        title: String::new(),
        media,
        content_description: description.to_string(),
        created: Timestamp::UNIX_EPOCH,
        has_audio: false,
        url: format!("{ORIGIN}view/{id}"),
    }
}

pub fn page(items: Vec<GifItem>, next: Option<&str>) -> SearchPage {
    SearchPage {
        items,
        next_cursor: next.map(str::to_string),
    }
}

/// `n` items that are pairwise distinct (no shared ratio+duration).
pub fn distinct_gifs(n: u32) -> Vec<GifItem> {
    (0..n)
        .map(|i| gif(&format!("g{i}"), "ok", (100 + i * 20, 100), 1.0 + f64::from(i), ""))
        .collect()
}

#[derive(Default)]
pub struct FakeUpstream {
    pages: Mutex<VecDeque<SearchPage>>,
    repeat: Option<SearchPage>,
    fail: bool,
    hang_on: Option<String>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl FakeUpstream {
    /// Serves `pages` in order, then empty final pages.
    pub fn with_pages(pages: Vec<SearchPage>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        })
    }

    /// Serves the same page on every call.
    pub fn repeating(page: SearchPage) -> Arc<Self> {
        Arc::new(Self {
            repeat: Some(page),
            ..Self::default()
        })
    }

    /// Like [`repeating`](Self::repeating), but never answers for `query`.
    pub fn repeating_except(page: SearchPage, query: &str) -> Arc<Self> {
        Arc::new(Self {
            repeat: Some(page),
            hang_on: Some(query.to_string()),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.requests().into_iter().map(|r| r.cursor).collect()
    }
}

#[async_trait]
impl UpstreamSearch for FakeUpstream {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, UpstreamError> {
        self.requests.lock().unwrap().push(request.clone());

        if self.hang_on.as_deref() == Some(request.query.as_str()) {
            return std::future::pending().await;
        }
        if self.fail {
            return Err(UpstreamError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        let next = self.pages.lock().unwrap().pop_front();
        Ok(next
            .or_else(|| self.repeat.clone())
            .unwrap_or_default())
    }
}

/// Mirrors `https://origin.test/<path>` to `<CDN><path>`. Every CDN URL
/// exists immediately unless built with [`invisible`](Self::invisible).
#[derive(Default)]
pub struct FakeGateway {
    pub upload_calls: AtomicUsize,
    pub exists_calls: AtomicUsize,
    invisible: bool,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Uploads succeed but the CDN never reports the copy as present.
    pub fn invisible() -> Arc<Self> {
        Arc::new(Self {
            invisible: true,
            ..Self::default()
        })
    }
}

#[async_trait]
impl RehostGateway for FakeGateway {
    async fn upload(&self, source_url: &str, _media_type: &str) -> Result<String, RehostError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let path = source_url.trim_start_matches(ORIGIN);

        if path.starts_with("hang/") {
            return std::future::pending().await;
        }
        if path.starts_with("foreign/") {
            return Ok(format!("https://elsewhere.test/{path}"));
        }
        Ok(format!("{CDN}{path}"))
    }

    async fn exists(&self, _url: &str) -> Result<bool, RehostError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(!self.invisible)
    }
}

/// A store whose every operation fails as if the backend were down.
pub struct UnavailableStore;

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("store is down".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store is down".to_string()))
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("store is down".to_string()))
    }
}

pub struct InstantClock;

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, _duration: Duration) {}
}

/// A store whose every operation hangs forever.
pub struct StallingStore;

#[async_trait]
impl KeyValueStore for StallingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<bool, StoreError> {
        std::future::pending().await
    }
}
