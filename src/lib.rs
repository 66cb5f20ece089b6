//! reelview - media detail overlay engine
//!
//! The state-and-data-flow core of a detail overlay for one selected media
//! item: open a modal surface, drive a trailer preview player through its
//! mount/ready/mute lifecycle, derive display metadata, and fetch a
//! "more like this" collection with per-key request deduplication.
//!
//! # Modules
//!
//! - `models` - Identity, detail, and related-item records + formatters
//! - `cache` - Keyed fetch cache (Pending / Resolved / Failed)
//! - `overlay` - Selection store and the overlay controller
//! - `player` - Playback engine seam and the player lifecycle adapter
//! - `api` - TMDB catalogue client
//! - `config` - Config file and API key resolution
//! - `cli` / `commands` - Scriptable CLI driver

pub mod api;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod overlay;
pub mod player;

// Re-export commonly used types
pub use models::{format_runtime, release_year, MediaDetail, MediaId, MediaType, RelatedSummary};

pub use cache::{CacheEntry, FetchCache};
pub use overlay::{
    FetchKind, FetchRequest, OverlayController, OverlayEvent, OverlayView, SelectionStore,
};
pub use player::{
    EngineEvent, NullEngine, PlaybackEngine, PlayerAdapter, PlayerError, PlayerOptions,
    PlayerState, DEFAULT_TRAILER_KEY, YOUTUBE_WATCH_URL,
};

#[cfg(unix)]
pub use player::MpvEngine;

pub use api::{TmdbClient, TmdbError};
