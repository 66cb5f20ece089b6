//! Overlay controller
//!
//! Orchestrates the detail overlay: one selection store, two keyed fetch
//! caches, and one player session per opening. The controller is a pure
//! state machine driven from a single task; fetch work happens in the
//! driver, which runs each returned `FetchRequest` and feeds the result
//! back as an `OverlayEvent`. Rendering always re-reads the current
//! selection, so a fetch that resolves after the selection moved on can
//! never surface stale fields.

use rand::Rng;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::cache::{CacheEntry, FetchCache};
use crate::models::{format_runtime, release_year, MediaDetail, MediaId, RelatedSummary};
use crate::player::{EngineEvent, PlaybackEngine, PlayerAdapter, PlayerState};

// =============================================================================
// Selection Store
// =============================================================================

/// Holder of "which item, if any, is selected for detail view".
///
/// Exactly one per controller; read-modify-write on the driving task only.
/// The controller observes changes synchronously inside its own
/// `select`/`close` operations.
#[derive(Debug, Default)]
pub struct SelectionStore {
    current: Option<MediaId>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: MediaId) {
        self.current = Some(id);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<MediaId> {
        self.current
    }
}

// =============================================================================
// Fetch Requests and Events
// =============================================================================

/// Which cache an outbound fetch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Detail,
    Related,
}

/// One outbound fetch the driver must issue on behalf of a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub kind: FetchKind,
    pub key: MediaId,
}

/// Events fed back into the controller by the driver
#[derive(Debug)]
pub enum OverlayEvent {
    DetailFetched {
        key: MediaId,
        result: Result<MediaDetail, String>,
    },
    RelatedFetched {
        key: MediaId,
        result: Result<Vec<RelatedSummary>, String>,
    },
    PlayerReady {
        muted: bool,
    },
}

impl From<EngineEvent> for OverlayEvent {
    fn from(event: EngineEvent) -> Self {
        match event {
            EngineEvent::Ready { muted } => OverlayEvent::PlayerReady { muted },
        }
    }
}

// =============================================================================
// Derived View
// =============================================================================

/// Display-field bundle derived from a resolved detail record.
///
/// `match_score` and `age_rating` are placeholder presentation values, not
/// derived from any record field.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayView {
    pub title: String,
    pub overview: String,
    /// First four characters of the release date
    pub year: String,
    /// "Xh Ym" / "Ym"
    pub runtime: String,
    /// "Genres: ..." comma-joined, source order
    pub genres: String,
    /// "Available in: ..." comma-joined, source order
    pub languages: String,
    pub match_score: u8,
    pub age_rating: String,
}

impl OverlayView {
    fn from_detail(detail: &MediaDetail) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            title: detail.title.clone(),
            overview: detail.overview.clone(),
            year: release_year(&detail.release_date),
            runtime: format_runtime(detail.runtime),
            genres: format!("Genres: {}", detail.genres.join(", ")),
            languages: format!("Available in: {}", detail.spoken_languages.join(", ")),
            match_score: rng.gen_range(0..100),
            age_rating: format!("{}+", rng.gen_range(0..20)),
        }
    }
}

// =============================================================================
// Overlay Controller
// =============================================================================

/// The open/view/close cycle of the detail overlay.
pub struct OverlayController {
    selection: SelectionStore,
    details: FetchCache<MediaId, MediaDetail>,
    related: FetchCache<MediaId, Vec<RelatedSummary>>,
    player: PlayerAdapter,
    engine_events: mpsc::UnboundedSender<EngineEvent>,
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("selection", &self.selection)
            .field("player", &self.player)
            .finish()
    }
}

impl OverlayController {
    /// Create a controller around a playback engine. Engine readiness
    /// arrives on `engine_events`; the driver forwards it back in as
    /// `OverlayEvent::PlayerReady`.
    pub fn new(
        engine: Box<dyn PlaybackEngine>,
        engine_events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        Self {
            selection: SelectionStore::new(),
            details: FetchCache::new(),
            related: FetchCache::new(),
            player: PlayerAdapter::new(engine),
            engine_events,
        }
    }

    /// Select `id` and open the overlay.
    ///
    /// Returns the outbound fetches the driver must issue; an empty vector
    /// means both caches answered from existing entries. A detail cache hit
    /// mounts the player immediately (reopen path).
    pub fn select(&mut self, id: MediaId) -> Vec<FetchRequest> {
        // A different item means a fresh player session
        if self.selection.current() != Some(id) {
            self.player.unmount();
        }
        self.selection.select(id);

        let mut requests = Vec::new();
        if self.details.request(id) {
            requests.push(FetchRequest {
                kind: FetchKind::Detail,
                key: id,
            });
        } else if let Some(detail) = self.details.resolved(&id) {
            let key = detail.trailer_keys.first().cloned();
            self.mount_player(key.as_deref());
        }
        if self.related.request(id) {
            requests.push(FetchRequest {
                kind: FetchKind::Related,
                key: id,
            });
        }
        requests
    }

    /// Close the overlay: clear the selection and tear the player down.
    /// In-flight fetches keep running and settle into their cache entries.
    pub fn close(&mut self) {
        self.selection.clear();
        self.player.unmount();
    }

    /// Whether the modal surface is rendered
    pub fn is_open(&self) -> bool {
        self.selection.current().is_some()
    }

    pub fn current_selection(&self) -> Option<MediaId> {
        self.selection.current()
    }

    /// Route one completion event into the caches / player session.
    pub fn handle_event(&mut self, event: OverlayEvent) {
        match event {
            OverlayEvent::DetailFetched { key, result } => {
                self.details.complete(key, result);
                // Only the current selection drives the player; stale keys
                // settle into the cache unobserved.
                if self.selection.current() == Some(key) {
                    match self.details.entry(&key) {
                        Some(CacheEntry::Resolved(detail)) => {
                            let trailer = detail.trailer_keys.first().cloned();
                            self.mount_player(trailer.as_deref());
                        }
                        Some(CacheEntry::Failed(_)) => {
                            // Overlay stays open with the fallback trailer
                            self.mount_player(None);
                        }
                        _ => {}
                    }
                }
            }
            OverlayEvent::RelatedFetched { key, result } => {
                self.related.complete(key, result);
            }
            OverlayEvent::PlayerReady { muted } => {
                self.player.on_ready(muted);
            }
        }
    }

    /// Derived display fields for the current selection.
    ///
    /// Recomputed from the caches at render time; `None` while the overlay
    /// is closed or the detail fetch has not resolved.
    pub fn view(&self) -> Option<OverlayView> {
        let id = self.selection.current()?;
        let detail = self.details.resolved(&id)?;
        Some(OverlayView::from_detail(detail))
    }

    /// Related items for the current selection, source order preserved.
    ///
    /// Empty when nothing is selected (no fetch is issued in that case) or
    /// when the related fetch failed or is still pending.
    pub fn related_items(&self) -> &[RelatedSummary] {
        match self.selection.current() {
            Some(id) => self
                .related
                .resolved(&id)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => &[],
        }
    }

    /// Mute flag for icon selection
    pub fn is_muted(&self) -> bool {
        self.player.is_muted()
    }

    pub fn player_state(&self) -> PlayerState {
        self.player.state()
    }

    /// Delegate the mute button to the player session; returns the
    /// resulting mirror flag.
    pub fn toggle_mute(&mut self) -> bool {
        self.player.toggle_mute()
    }

    fn mount_player(&mut self, trailer_key: Option<&str>) {
        // Engine startup failure degrades to a never-ready session
        let _ = self.player.mount(trailer_key, &self.engine_events);
    }
}
