use crate::model::{formats, GifItem, MediaRendition};
use std::collections::BTreeSet;

const STOPWORDS: [&str; 16] = [
    "the", "and", "for", "with", "this", "that", "you", "are", "from", "was", "but", "not", "gif",
    "animated", "its", "his",
];

/// Lightweight descriptors derived from a [`GifItem`] for deduplication.
///
/// Never persisted; recompute it from the item whenever it is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct GifMetadata {
    /// Width divided by height, or `0.0` when unknown.
    pub aspect_ratio: f64,
    /// Duration in seconds rounded to one decimal place.
    pub duration: f64,
    /// Lowercase words of the content description longer than two
    /// characters, stopwords removed. The title is not consulted.
    pub words: BTreeSet<String>,
}

impl GifMetadata {
    pub fn from_item(item: &GifItem) -> Self {
        let rendition = Self::measured_rendition(item);

        let aspect_ratio = rendition
            .filter(|r| r.width > 0 && r.height > 0)
            .map(|r| f64::from(r.width) / f64::from(r.height))
            .unwrap_or(0.0);

        let duration = rendition
            .map(|r| (r.duration_seconds * 10.0).round() / 10.0)
            .unwrap_or(0.0);

        let words = content_words(&item.content_description);

        Self {
            aspect_ratio,
            duration,
            words,
        }
    }

    pub fn has_aspect_ratio(&self) -> bool {
        self.aspect_ratio > 0.0
    }

    // Upstream dimensions live on the full rendition; the thumbnail is only
    // consulted when the full one is a placeholder.
    fn measured_rendition(item: &GifItem) -> Option<&MediaRendition> {
        [formats::FULL, formats::THUMBNAIL]
            .into_iter()
            .filter_map(|format| item.media.get(format))
            .find(|r| r.width > 0 && r.height > 0)
            .or_else(|| item.media.get(formats::FULL))
    }
}

fn content_words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() > 2 && !STOPWORDS.contains(&word.as_str()))
        .collect()
}
