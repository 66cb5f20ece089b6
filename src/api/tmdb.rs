//! TMDB (The Movie Database) API client
//!
//! Detail and related-item lookups for the overlay.
//! API docs: https://developer.themoviedb.org/docs

use anyhow::Result;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{MediaDetail, MediaId, MediaType, RelatedSummary};

/// TMDB API error types
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("Resource not found (404)")]
    NotFound,

    #[error("Rate limited (429), retries exhausted")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// TMDB API client
#[derive(Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://api.themoviedb.org/3")
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
        }
    }

    /// Make an authenticated GET request with retry logic for rate limits
    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut retries = 0;

        loop {
            let response = self
                .client
                .get(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Accept", "application/json")
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.text().await?;
                    let parsed: T = serde_json::from_str(&body).map_err(|e| {
                        TmdbError::InvalidResponse(format!("JSON parse error: {}", e))
                    })?;
                    return Ok(parsed);
                }
                StatusCode::NOT_FOUND => {
                    return Err(TmdbError::NotFound.into());
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    retries += 1;
                    if retries >= self.max_retries {
                        return Err(TmdbError::RateLimited.into());
                    }

                    // Honor Retry-After, or fall back to exponential backoff
                    let wait_secs = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(2u64.pow(retries));

                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                    continue;
                }
                status => {
                    return Err(TmdbError::ServerError(status.as_u16()).into());
                }
            }
        }
    }

    /// Get full detail for a movie or TV show, trailers included
    pub async fn detail(&self, id: MediaId) -> Result<MediaDetail> {
        let endpoint = format!(
            "/{}/{}?append_to_response=videos",
            id.media_type.as_str(),
            id.id
        );
        let response: DetailResponse = self.get(&endpoint).await?;
        Ok(response.into_detail(id.media_type))
    }

    /// Get the ordered "more like this" collection for a movie or TV show
    pub async fn similar(&self, id: MediaId) -> Result<Vec<RelatedSummary>> {
        let endpoint = format!("/{}/{}/similar?page=1", id.media_type.as_str(), id.id);
        let response: SimilarResponse = self.get(&endpoint).await?;
        Ok(response.into_summaries(id.media_type))
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: u64,
    // Movies use "title", TV uses "name"
    title: Option<String>,
    name: Option<String>,
    // Movies use "release_date", TV uses "first_air_date"
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    // Movies carry a single runtime, TV a per-episode list
    runtime: Option<u32>,
    episode_run_time: Option<Vec<u32>>,
    #[serde(default)]
    genres: Vec<GenreRaw>,
    #[serde(default)]
    spoken_languages: Vec<LanguageRaw>,
    videos: Option<VideosRaw>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
}

impl DetailResponse {
    fn into_detail(self, media_type: MediaType) -> MediaDetail {
        let runtime = self
            .runtime
            .or_else(|| self.episode_run_time.as_ref().and_then(|r| r.first().copied()))
            .unwrap_or(0);

        let trailer_keys = self
            .videos
            .map(|v| {
                v.results
                    .into_iter()
                    .filter(|video| video.site == "YouTube")
                    .map(|video| video.key)
                    .collect()
            })
            .unwrap_or_default();

        MediaDetail {
            id: self.id,
            media_type,
            title: self.title.or(self.name).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            release_date: self.release_date.or(self.first_air_date).unwrap_or_default(),
            runtime,
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            spoken_languages: self.spoken_languages.into_iter().map(|l| l.name).collect(),
            trailer_keys,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenreRaw {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LanguageRaw {
    name: String,
}

#[derive(Debug, Deserialize)]
struct VideosRaw {
    results: Vec<VideoRaw>,
}

#[derive(Debug, Deserialize)]
struct VideoRaw {
    key: String,
    site: String,
}

#[derive(Debug, Deserialize)]
struct SimilarResponse {
    results: Vec<SimilarRaw>,
}

impl SimilarResponse {
    fn into_summaries(self, media_type: MediaType) -> Vec<RelatedSummary> {
        // Relevance order from TMDB is preserved, never re-sorted
        self.results
            .into_iter()
            .map(|r| RelatedSummary {
                id: r.id,
                media_type,
                title: r.title.or(r.name).unwrap_or_default(),
                poster_path: r.poster_path,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SimilarRaw {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    poster_path: Option<String>,
}
