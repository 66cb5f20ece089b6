//! Player adapter tests
//!
//! Drives the adapter state machine against recording and failing engines:
//! source URL construction, fixed preview policy, and degradation when the
//! engine cannot start.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use reelview::player::{
    EngineEvent, PlaybackEngine, PlayerAdapter, PlayerError, PlayerOptions, PlayerState,
    DEFAULT_TRAILER_KEY, YOUTUBE_WATCH_URL,
};

// =============================================================================
// Recording Engine
// =============================================================================

#[derive(Debug, Default)]
struct MountLog {
    urls: Vec<String>,
    options: Vec<PlayerOptions>,
    unmounts: usize,
}

#[derive(Debug, Clone, Default)]
struct RecordingEngine {
    log: Arc<Mutex<MountLog>>,
}

impl PlaybackEngine for RecordingEngine {
    fn mount(
        &mut self,
        source_url: &str,
        options: &PlayerOptions,
        _events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<(), PlayerError> {
        let mut log = self.log.lock().unwrap();
        log.urls.push(source_url.to_string());
        log.options.push(*options);
        Ok(())
    }

    fn set_muted(&mut self, _muted: bool) -> Result<(), PlayerError> {
        Ok(())
    }

    fn unmount(&mut self) {
        self.log.lock().unwrap().unmounts += 1;
    }
}

/// Engine whose startup always fails (binary missing)
#[derive(Debug)]
struct BrokenEngine;

impl PlaybackEngine for BrokenEngine {
    fn mount(
        &mut self,
        _source_url: &str,
        _options: &PlayerOptions,
        _events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<(), PlayerError> {
        Err(PlayerError::NotFound("mpv".to_string()))
    }

    fn set_muted(&mut self, _muted: bool) -> Result<(), PlayerError> {
        Err(PlayerError::NotMounted)
    }

    fn unmount(&mut self) {}
}

// =============================================================================
// Source URL and Policy
// =============================================================================

#[tokio::test]
async fn test_mount_builds_watch_url_from_trailer_key() {
    let engine = RecordingEngine::default();
    let log = engine.log.clone();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut adapter = PlayerAdapter::new(Box::new(engine));

    adapter.mount(Some("vKQi3bBA1y8"), &tx).unwrap();

    let urls = log.lock().unwrap().urls.clone();
    assert_eq!(urls, vec![format!("{}vKQi3bBA1y8", YOUTUBE_WATCH_URL)]);
}

#[tokio::test]
async fn test_mount_falls_back_to_default_trailer() {
    let engine = RecordingEngine::default();
    let log = engine.log.clone();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut adapter = PlayerAdapter::new(Box::new(engine));

    adapter.mount(None, &tx).unwrap();

    let urls = log.lock().unwrap().urls.clone();
    assert_eq!(urls, vec![format!("{}{}", YOUTUBE_WATCH_URL, DEFAULT_TRAILER_KEY)]);
}

#[tokio::test]
async fn test_mount_always_uses_preview_policy() {
    let engine = RecordingEngine::default();
    let log = engine.log.clone();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut adapter = PlayerAdapter::new(Box::new(engine));

    adapter.mount(Some("abc"), &tx).unwrap();

    let options = log.lock().unwrap().options.clone();
    assert_eq!(options, vec![PlayerOptions::PREVIEW]);
}

#[tokio::test]
async fn test_second_mount_in_same_session_is_ignored() {
    let engine = RecordingEngine::default();
    let log = engine.log.clone();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut adapter = PlayerAdapter::new(Box::new(engine));

    adapter.mount(Some("first"), &tx).unwrap();
    adapter.mount(Some("second"), &tx).unwrap();

    assert_eq!(log.lock().unwrap().urls.len(), 1);
}

// =============================================================================
// Teardown
// =============================================================================

#[tokio::test]
async fn test_unmount_releases_engine_once() {
    let engine = RecordingEngine::default();
    let log = engine.log.clone();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut adapter = PlayerAdapter::new(Box::new(engine));

    adapter.mount(None, &tx).unwrap();
    adapter.unmount();
    // Unmounting an already-unmounted session does not touch the engine
    adapter.unmount();

    assert_eq!(log.lock().unwrap().unmounts, 1);
    assert_eq!(adapter.state(), PlayerState::Unmounted);
}

// =============================================================================
// Engine Failure
// =============================================================================

#[tokio::test]
async fn test_failed_mount_leaves_session_unmounted() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut adapter = PlayerAdapter::new(Box::new(BrokenEngine));

    let result = adapter.mount(Some("abc"), &tx);
    assert!(matches!(result, Err(PlayerError::NotFound(_))));
    assert_eq!(adapter.state(), PlayerState::Unmounted);

    // Mute toggling stays a permanent no-op for this session
    assert!(adapter.toggle_mute());
    assert!(adapter.is_muted());
}
