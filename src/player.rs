//! Player lifecycle adapter
//!
//! Wraps a playback engine behind a narrow mount/ready/mute contract so the
//! overlay never touches the engine handle directly. The adapter is a small
//! state machine: `Unmounted -> Mounting -> Ready -> Unmounted`. Mute state
//! is mirrored from the engine at readiness and flipped together with it.
//!
//! Two engines ship with the crate: an mpv-backed one (unix, JSON IPC) and
//! a headless `NullEngine` for CLI output and tests.

use thiserror::Error;
use tokio::sync::mpsc;

#[cfg(unix)]
use std::path::PathBuf;
#[cfg(unix)]
use std::process::Stdio;
#[cfg(unix)]
use tokio::process::{Child, Command};

/// Fallback trailer when a detail record carries no video keys
pub const DEFAULT_TRAILER_KEY: &str = "L3oOldViIgY";

/// Base URL for YouTube trailer playback
pub const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

// =============================================================================
// Engine Contract
// =============================================================================

/// Fixed preview playback policy. These are constants of the overlay, not
/// caller-supplied parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerOptions {
    pub loop_playback: bool,
    pub autoplay: bool,
    pub controls: bool,
    pub responsive: bool,
}

impl PlayerOptions {
    /// Autoplaying, looping, chrome-less trailer preview
    pub const PREVIEW: PlayerOptions = PlayerOptions {
        loop_playback: true,
        autoplay: true,
        controls: false,
        responsive: true,
    };
}

/// Events emitted by a mounted engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine finished loading; carries its actual initial mute flag
    Ready { muted: bool },
}

/// Errors from playback engine operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("Player is not mounted")]
    NotMounted,
}

/// A playback engine as seen by the adapter.
///
/// Readiness is reported asynchronously on the channel handed to `mount`;
/// everything else is a non-blocking call on the driving task.
pub trait PlaybackEngine {
    /// Start playback of `source_url` under the given policy. The engine
    /// sends `EngineEvent::Ready` on `events` once it is controllable.
    fn mount(
        &mut self,
        source_url: &str,
        options: &PlayerOptions,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<(), PlayerError>;

    /// Set the engine mute flag
    fn set_muted(&mut self, muted: bool) -> Result<(), PlayerError>;

    /// Release the engine instance. Idempotent.
    fn unmount(&mut self);
}

// =============================================================================
// Player Adapter
// =============================================================================

/// Adapter session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Unmounted,
    Mounting,
    Ready,
}

/// One mounted player lifetime bound to one overlay opening.
///
/// The session is destroyed and recreated whenever the overlay closes and
/// reopens; the engine instance is never reused across selections.
pub struct PlayerAdapter {
    engine: Box<dyn PlaybackEngine>,
    state: PlayerState,
    muted: bool,
}

impl std::fmt::Debug for PlayerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerAdapter")
            .field("state", &self.state)
            .field("muted", &self.muted)
            .finish()
    }
}

impl PlayerAdapter {
    pub fn new(engine: Box<dyn PlaybackEngine>) -> Self {
        Self {
            engine,
            state: PlayerState::Unmounted,
            muted: true,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == PlayerState::Ready
    }

    /// Mirrored engine mute flag (meaningful once `Ready`)
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Mount the engine on the trailer for `trailer_key`, falling back to
    /// the default preview trailer when the detail record has none.
    ///
    /// Mounting while a session is already up is ignored; callers tear the
    /// session down first when the selection changes.
    pub fn mount(
        &mut self,
        trailer_key: Option<&str>,
        events: &mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<(), PlayerError> {
        if self.state != PlayerState::Unmounted {
            return Ok(());
        }
        let key = trailer_key.unwrap_or(DEFAULT_TRAILER_KEY);
        let url = format!("{}{}", YOUTUBE_WATCH_URL, key);
        self.engine
            .mount(&url, &PlayerOptions::PREVIEW, events.clone())?;
        self.state = PlayerState::Mounting;
        Ok(())
    }

    /// Engine readiness callback. Adopts the engine's actual initial mute
    /// flag rather than assuming it.
    pub fn on_ready(&mut self, engine_muted: bool) {
        if self.state == PlayerState::Mounting {
            self.state = PlayerState::Ready;
            self.muted = engine_muted;
        }
    }

    /// Flip the engine mute flag and the mirrored flag together.
    ///
    /// A no-op before `Ready` or after unmount: the current mirror value is
    /// returned unchanged and no error is raised.
    pub fn toggle_mute(&mut self) -> bool {
        if self.state == PlayerState::Ready {
            let next = !self.muted;
            if self.engine.set_muted(next).is_ok() {
                self.muted = next;
            }
        }
        self.muted
    }

    /// Tear the session down unconditionally
    pub fn unmount(&mut self) {
        if self.state != PlayerState::Unmounted {
            self.engine.unmount();
        }
        self.state = PlayerState::Unmounted;
        self.muted = true;
    }
}

// =============================================================================
// Null Engine
// =============================================================================

/// Headless engine: reports ready immediately and tracks mute in memory.
/// Used by the CLI `open` command and anywhere playback is not wanted.
#[derive(Debug)]
pub struct NullEngine {
    muted: bool,
    mounted: bool,
}

impl Default for NullEngine {
    fn default() -> Self {
        Self {
            muted: true,
            mounted: false,
        }
    }
}

impl NullEngine {
    /// Engine whose initial mute flag differs from the usual default
    pub fn with_muted(muted: bool) -> Self {
        Self {
            muted,
            mounted: false,
        }
    }
}

impl PlaybackEngine for NullEngine {
    fn mount(
        &mut self,
        _source_url: &str,
        _options: &PlayerOptions,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<(), PlayerError> {
        self.mounted = true;
        let _ = events.send(EngineEvent::Ready { muted: self.muted });
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), PlayerError> {
        if !self.mounted {
            return Err(PlayerError::NotMounted);
        }
        self.muted = muted;
        Ok(())
    }

    fn unmount(&mut self) {
        self.mounted = false;
        self.muted = true;
    }
}

// =============================================================================
// mpv Engine (unix)
// =============================================================================

/// mpv-backed engine controlled over its JSON IPC socket.
///
/// mpv is spawned with the preview policy flags and `--input-ipc-server`;
/// an IPC task connects to the socket, queries the initial mute flag for
/// the readiness event, and forwards mute commands afterwards. If mpv is
/// missing or the socket never comes up the session simply never reaches
/// `Ready` and mute toggling stays a no-op.
#[cfg(unix)]
#[derive(Debug, Default)]
pub struct MpvEngine {
    child: Option<Child>,
    socket_path: Option<PathBuf>,
    commands: Option<mpsc::UnboundedSender<bool>>,
}

#[cfg(unix)]
impl MpvEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(unix)]
impl PlaybackEngine for MpvEngine {
    fn mount(
        &mut self,
        source_url: &str,
        options: &PlayerOptions,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<(), PlayerError> {
        let socket = std::env::temp_dir().join(format!("reelview-mpv-{}.sock", uuid::Uuid::new_v4()));

        let mut cmd = Command::new("mpv");
        cmd.arg(source_url);
        cmd.arg(format!("--input-ipc-server={}", socket.display()));
        // Preview policy: autoplaying, looping, muted by default, no chrome
        cmd.arg("--mute=yes");
        if options.loop_playback {
            cmd.arg("--loop-file=inf");
        }
        if !options.controls {
            cmd.arg("--no-osc");
        }
        if options.responsive {
            cmd.arg("--force-window=immediate");
        }
        if options.autoplay {
            cmd.arg("--pause=no");
        }
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound("mpv".to_string())
            } else {
                PlayerError::StartFailed(e)
            }
        })?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(mpv_ipc_task(socket.clone(), events, cmd_rx));

        self.child = Some(child);
        self.socket_path = Some(socket);
        self.commands = Some(cmd_tx);
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), PlayerError> {
        match &self.commands {
            Some(tx) => tx.send(muted).map_err(|_| PlayerError::NotMounted),
            None => Err(PlayerError::NotMounted),
        }
    }

    fn unmount(&mut self) {
        // Dropping the command sender stops the IPC task
        self.commands = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
        if let Some(path) = self.socket_path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// IPC side of the mpv engine: connect, query initial mute, then forward
/// mute commands until mpv exits or the engine is unmounted.
#[cfg(unix)]
async fn mpv_ipc_task(
    socket: PathBuf,
    events: mpsc::UnboundedSender<EngineEvent>,
    mut commands: mpsc::UnboundedReceiver<bool>,
) {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::UnixStream;
    use tokio::time::{sleep, Duration};

    // mpv creates the socket shortly after startup; poll for it
    let mut connected = None;
    for _ in 0..50 {
        match UnixStream::connect(&socket).await {
            Ok(stream) => {
                connected = Some(stream);
                break;
            }
            Err(_) => sleep(Duration::from_millis(100)).await,
        }
    }
    let Some(stream) = connected else {
        // Engine never became controllable; Ready never fires
        return;
    };

    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let query = b"{\"command\":[\"get_property\",\"mute\"],\"request_id\":1}\n";
    if write_half.write_all(query).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let Ok(msg) = serde_json::from_str::<serde_json::Value>(&line) else {
                    continue;
                };
                if msg.get("request_id").and_then(|v| v.as_u64()) == Some(1) {
                    let muted = msg.get("data").and_then(|v| v.as_bool()).unwrap_or(true);
                    let _ = events.send(EngineEvent::Ready { muted });
                }
                // mpv playback/property events are ignored
            }
            cmd = commands.recv() => {
                match cmd {
                    Some(muted) => {
                        let payload =
                            format!("{{\"command\":[\"set_property\",\"mute\",{}]}}\n", muted);
                        if write_half.write_all(payload.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                    // Engine unmounted
                    None => break,
                }
            }
        }
    }
}
