//! Wire format of the search endpoint.

use gifvault_core::{GifItem, MediaRendition, SearchPage};
use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<TenorResult>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenorResult {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub media_formats: HashMap<String, TenorMedia>,
    #[serde(default)]
    pub created: f64,
    #[serde(default)]
    pub content_description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub hasaudio: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenorMedia {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub dims: Vec<u32>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub size: u64,
}

impl From<TenorMedia> for MediaRendition {
    fn from(media: TenorMedia) -> Self {
        let (width, height) = match media.dims.as_slice() {
            [width, height, ..] => (*width, *height),
            _ => (0, 0),
        };
        MediaRendition {
            url: media.url,
            width,
            height,
            duration_seconds: media.duration,
            size_bytes: media.size,
        }
    }
}

impl From<TenorResult> for GifItem {
    fn from(result: TenorResult) -> Self {
        let created = SignedDuration::try_from_secs_f64(result.created)
            .and_then(Timestamp::from_duration)
            .unwrap_or_else(|e| {
                warn!(item_id = %result.id, error = %e, "invalid creation time");
                Timestamp::UNIX_EPOCH
            });

        GifItem {
            id: result.id,
            title: result.title,
            media: result
                .media_formats
                .into_iter()
                .map(|(format, media)| (format, MediaRendition::from(media)))
                .collect::<BTreeMap<_, _>>(),
            content_description: result.content_description,
            created,
            has_audio: result.hasaudio,
            url: result.url,
        }
    }
}

impl From<SearchResponse> for SearchPage {
    fn from(response: SearchResponse) -> Self {
        SearchPage {
            items: response.results.into_iter().map(GifItem::from).collect(),
            // The provider reports the end of results as an empty token.
            next_cursor: response
                .next
                .filter(|cursor| !cursor.is_empty() && cursor != "0"),
        }
    }
}
