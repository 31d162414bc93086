//! Metadata-based near-duplicate detection.
//!
//! Scoring runs the cheap numeric checks first and only looks at word
//! overlap when the aspect ratio already matched:
//!
//! | check                                   | points |
//! |-----------------------------------------|--------|
//! | aspect ratios within 5% of each other   | 40     |
//! | durations within 0.2 s                  | 30     |
//! | word overlap above 50% (after a ratio match) | 30 |
//!
//! A pair scoring [`DUPLICATE_THRESHOLD`] or more is a duplicate.

use crate::metadata::GifMetadata;
use std::collections::HashMap;

/// Score at or above which two items are treated as the same content.
pub const DUPLICATE_THRESHOLD: u32 = 70;

const ASPECT_RATIO_POINTS: u32 = 40;
const DURATION_POINTS: u32 = 30;
const WORD_OVERLAP_POINTS: u32 = 30;

const ASPECT_RATIO_TOLERANCE: f64 = 0.05;
// Durations are compared in whole tenths of a second.
const DURATION_TOLERANCE_TENTHS: i64 = 2;
const WORD_OVERLAP_RATIO: f64 = 0.5;

/// Scores how alike two items are, stopping as soon as the duplicate
/// threshold is reached.
pub fn similarity_score(candidate: &GifMetadata, existing: &GifMetadata) -> u32 {
    let mut score = 0;

    if candidate.has_aspect_ratio() && existing.has_aspect_ratio() {
        let larger = candidate.aspect_ratio.max(existing.aspect_ratio);
        let difference = (candidate.aspect_ratio - existing.aspect_ratio).abs() / larger;
        if difference < ASPECT_RATIO_TOLERANCE {
            score += ASPECT_RATIO_POINTS;
        }
    }

    let duration_gap = (tenths(candidate.duration) - tenths(existing.duration)).abs();
    if duration_gap < DURATION_TOLERANCE_TENTHS {
        score += DURATION_POINTS;
    }

    if score >= DUPLICATE_THRESHOLD {
        return score;
    }

    if score >= ASPECT_RATIO_POINTS
        && !candidate.words.is_empty()
        && !existing.words.is_empty()
        && word_overlap(candidate, existing) > WORD_OVERLAP_RATIO
    {
        score += WORD_OVERLAP_POINTS;
    }

    score
}

fn tenths(seconds: f64) -> i64 {
    (seconds * 10.0).round() as i64
}

// Intersection over the smaller set.
fn word_overlap(a: &GifMetadata, b: &GifMetadata) -> f64 {
    let (smaller, larger) = if a.words.len() <= b.words.len() {
        (&a.words, &b.words)
    } else {
        (&b.words, &a.words)
    };
    let shared = smaller.iter().filter(|word| larger.contains(*word)).count();
    shared as f64 / smaller.len() as f64
}

/// Metadata of the items accepted so far for one query.
///
/// Lookups are linear in the number of accepted items, which stays small
/// (a result set holds at most a few dozen items).
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    accepted: HashMap<String, GifMetadata>,
}

impl SimilarityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ID of the first accepted item `candidate` duplicates.
    pub fn find_duplicate(&self, candidate: &GifMetadata) -> Option<&str> {
        self.accepted
            .iter()
            .find(|(_, existing)| similarity_score(candidate, existing) >= DUPLICATE_THRESHOLD)
            .map(|(id, _)| id.as_str())
    }

    pub fn is_duplicate(&self, candidate: &GifMetadata) -> bool {
        self.find_duplicate(candidate).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accepted.contains_key(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, metadata: GifMetadata) {
        self.accepted.insert(id.into(), metadata);
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}
