//! CLI command handlers
//!
//! Each handler drives the overlay controller through a full
//! select -> fetch -> render cycle: the controller stays a pure state
//! machine, the handler runs its fetch requests as tokio tasks and feeds
//! completions back as overlay events.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::api::TmdbClient;
use crate::cli::{ExitCode, OpenCmd, Output, PreviewCmd};
use crate::config::Config;
use crate::models::RelatedSummary;
use crate::overlay::{FetchKind, FetchRequest, OverlayController, OverlayEvent, OverlayView};
use crate::player::NullEngine;

/// Combined output of the `open` command
#[derive(Serialize)]
struct OverlayReport {
    #[serde(flatten)]
    view: OverlayView,
    muted: bool,
    related: Vec<RelatedSummary>,
}

/// Run the fetch requests the controller asked for; completions arrive on
/// `tx`. Returns how many completions to expect.
fn spawn_fetches(
    requests: Vec<FetchRequest>,
    client: &TmdbClient,
    tx: &mpsc::UnboundedSender<OverlayEvent>,
) -> usize {
    let count = requests.len();
    for req in requests {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            match req.kind {
                FetchKind::Detail => {
                    let result = client.detail(req.key).await.map_err(|e| e.to_string());
                    let _ = tx.send(OverlayEvent::DetailFetched {
                        key: req.key,
                        result,
                    });
                }
                FetchKind::Related => {
                    let result = client.similar(req.key).await.map_err(|e| e.to_string());
                    let _ = tx.send(OverlayEvent::RelatedFetched {
                        key: req.key,
                        result,
                    });
                }
            }
        });
    }
    count
}

// =============================================================================
// Open Command
// =============================================================================

pub async fn open_cmd(cmd: OpenCmd, output: &Output) -> ExitCode {
    let config = Config::load();
    let api_key = match config.get_tmdb_api_key() {
        Ok(key) => key,
        Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
    };
    let client = TmdbClient::new(api_key);
    let id = cmd.media_id();

    let (engine_tx, mut engine_rx) = mpsc::unbounded_channel();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut overlay = OverlayController::new(Box::new(NullEngine::default()), engine_tx);

    output.info(format!("Opening overlay for {}", id));

    let mut outstanding = spawn_fetches(overlay.select(id), &client, &tx);

    while outstanding > 0 {
        tokio::select! {
            Some(event) = rx.recv() => {
                outstanding -= 1;
                overlay.handle_event(event);
            }
            Some(engine_event) = engine_rx.recv() => {
                overlay.handle_event(engine_event.into());
            }
            else => break,
        }
    }
    // Engine readiness raised while settling the fetches
    while let Ok(engine_event) = engine_rx.try_recv() {
        overlay.handle_event(engine_event.into());
    }

    match overlay.view() {
        Some(view) => {
            let report = OverlayReport {
                view,
                muted: overlay.is_muted(),
                related: overlay.related_items().to_vec(),
            };
            if let Err(e) = output.print(&report) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        None => output.error(
            format!("Detail fetch failed for {}", id),
            ExitCode::NetworkError,
        ),
    }
}

// =============================================================================
// Preview Command
// =============================================================================

pub async fn preview_cmd(cmd: PreviewCmd, output: &Output) -> ExitCode {
    #[cfg(not(unix))]
    {
        let _ = cmd;
        return output.error(
            "Trailer preview requires mpv on a unix platform",
            ExitCode::PlayerFailed,
        );
    }

    #[cfg(unix)]
    {
        use crate::player::{MpvEngine, PlayerState};
        use tokio::io::{AsyncBufReadExt, BufReader};

        let config = Config::load();
        let api_key = match config.get_tmdb_api_key() {
            Ok(key) => key,
            Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
        };
        let client = TmdbClient::new(api_key);
        let id = cmd.media_id();

        let (engine_tx, mut engine_rx) = mpsc::unbounded_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut overlay = OverlayController::new(Box::new(MpvEngine::new()), engine_tx);

        output.info(format!("Starting trailer preview for {}", id));
        output.info("Press 'm' + Enter to toggle mute, 'q' + Enter to quit");

        let _ = spawn_fetches(overlay.select(id), &client, &tx);

        let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    overlay.handle_event(event);
                }
                Some(engine_event) = engine_rx.recv() => {
                    overlay.handle_event(engine_event.into());
                    if overlay.player_state() == PlayerState::Ready {
                        let label = if overlay.is_muted() { "muted" } else { "unmuted" };
                        output.info(format!("Preview playing ({})", label));
                    }
                }
                line = stdin_lines.next_line() => {
                    match line {
                        Ok(Some(line)) => match line.trim() {
                            "m" => {
                                let muted = overlay.toggle_mute();
                                if overlay.player_state() == PlayerState::Ready {
                                    let label = if muted { "muted" } else { "unmuted" };
                                    output.info(format!("Preview {}", label));
                                } else {
                                    output.info("Player not ready yet");
                                }
                            }
                            "q" => break,
                            _ => {}
                        },
                        _ => break,
                    }
                }
            }
        }

        overlay.close();
        ExitCode::Success
    }
}
