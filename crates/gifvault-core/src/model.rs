use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rendition format names as reported by the upstream provider.
pub mod formats {
    /// Full-size rendition. Kept on its origin URL as a fallback reference.
    pub const FULL: &str = "gif";
    /// Small rendition. The only one re-hosted, and the default for display.
    pub const THUMBNAIL: &str = "tinygif";
    /// Smallest preview rendition.
    pub const PREVIEW: &str = "nanogif";

    /// Formats every processed item is guaranteed to carry, possibly as
    /// empty placeholders.
    pub const REQUIRED: [&str; 3] = [FULL, THUMBNAIL, PREVIEW];
}

/// One encoded variant of a GIF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRendition {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub duration_seconds: f64,
    pub size_bytes: u64,
}

impl MediaRendition {
    /// An all-empty rendition standing in for a format the upstream omitted.
    pub fn placeholder() -> Self {
        Self::default()
    }
}

/// A single GIF as returned by the upstream provider, possibly re-hosted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifItem {
    /// Upstream-assigned opaque identifier.
    pub id: String,
    pub title: String,
    /// Renditions keyed by format name (see [`formats`]).
    pub media: BTreeMap<String, MediaRendition>,
    pub content_description: String,
    pub created: Timestamp,
    pub has_audio: bool,
    /// Canonical display URL. Empty when the item is unusable.
    pub url: String,
}

impl GifItem {
    /// Returns the rendition served by default (the thumbnail).
    pub fn default_rendition(&self) -> Option<&MediaRendition> {
        self.media.get(formats::THUMBNAIL)
    }

    /// Inserts empty placeholders for any required format the item lacks.
    pub fn fill_missing_formats(&mut self) {
        for format in formats::REQUIRED {
            self.media
                .entry(format.to_string())
                .or_insert_with(MediaRendition::placeholder);
        }
    }

    /// Whether both the canonical URL and the default rendition URL live
    /// under `cdn_prefix`.
    pub fn is_hosted_on(&self, cdn_prefix: &str) -> bool {
        !cdn_prefix.is_empty()
            && self.url.starts_with(cdn_prefix)
            && self
                .default_rendition()
                .is_some_and(|rendition| rendition.url.starts_with(cdn_prefix))
    }

    /// Clears the canonical and thumbnail URLs, marking the item unusable.
    pub fn mark_unusable(&mut self) {
        self.url.clear();
        if let Some(rendition) = self.media.get_mut(formats::THUMBNAIL) {
            rendition.url.clear();
        }
    }
}

/// The accepted, deduplicated items collected for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    pub query: String,
    pub items: Vec<GifItem>,
}

impl SearchResultSet {
    pub fn new(query: impl Into<String>, items: Vec<GifItem>) -> Self {
        Self {
            query: query.into(),
            items,
        }
    }

    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item IDs in result order.
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }
}
