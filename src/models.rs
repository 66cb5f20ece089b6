//! Core data model
//!
//! Identity, detail, and related-item records shared between the cache,
//! the overlay controller, and the TMDB client, plus the display
//! formatters derived from them.

use serde::{Deserialize, Serialize};

// =============================================================================
// Media Identity
// =============================================================================

/// Media kind: movie or TV show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// TMDB path segment for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The (kind, id) pair uniquely addressing one media item.
///
/// Structural equality; used as the key for both fetch caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaId {
    pub media_type: MediaType,
    pub id: u64,
}

impl MediaId {
    pub fn movie(id: u64) -> Self {
        Self {
            media_type: MediaType::Movie,
            id,
        }
    }

    pub fn tv(id: u64) -> Self {
        Self {
            media_type: MediaType::Tv,
            id,
        }
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.media_type, self.id)
    }
}

// =============================================================================
// Detail Record
// =============================================================================

/// Resolved metadata for one media item.
///
/// Immutable once resolved; a newer fetch for the same identity supersedes
/// the whole record, it is never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDetail {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: String,
    /// Release date (movies) or first air date (TV), "YYYY-MM-DD"
    pub release_date: String,
    /// Runtime in minutes (0 when unknown)
    pub runtime: u32,
    /// Genre names, source order preserved
    pub genres: Vec<String>,
    /// Spoken-language names, source order preserved
    pub spoken_languages: Vec<String>,
    /// YouTube trailer keys, source order preserved
    pub trailer_keys: Vec<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

// =============================================================================
// Related Item Summary
// =============================================================================

/// Lightweight record for one entry in the "more like this" grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedSummary {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    /// Thumbnail reference (TMDB poster path)
    pub poster_path: Option<String>,
}

// =============================================================================
// Display Formatters
// =============================================================================

/// Format a runtime in minutes as "Xh Ym" or "Ym"
pub fn format_runtime(minutes: u32) -> String {
    let h = minutes / 60;
    let m = minutes % 60;
    if h > 0 {
        format!("{}h {}m", h, m)
    } else {
        format!("{}m", m)
    }
}

/// First four characters of a release date ("2022-03-04" -> "2022")
pub fn release_year(date: &str) -> String {
    date.chars().take(4).collect()
}
