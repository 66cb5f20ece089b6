//! CLI - command line driver for the overlay core
//!
//! Every overlay operation is scriptable and the output is JSON-parseable,
//! so the open/view/close cycle can be exercised from automation.
//!
//! # Examples
//!
//! ```bash
//! # Open the overlay for a movie and print the derived fields
//! reelview open -t movie 603 --json
//!
//! # Play the trailer preview in mpv, toggle mute from stdin
//! reelview preview -t tv 1396
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::IsTerminal;

use crate::models::{MediaId, MediaType};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Player failed to start
    PlayerFailed = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// reelview - media detail overlay engine
#[derive(Parser, Debug)]
#[command(
    name = "reelview",
    version,
    about = "Media detail overlay: cached TMDB detail, related items, and trailer preview",
    after_help = "EXAMPLES:\n\
                  reelview open -t movie 603          Show detail + related items\n\
                  reelview open -t tv 1396 --json     Machine-readable output\n\
                  reelview preview -t movie 603       Autoplay the trailer in mpv"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the overlay for an item and print the derived display fields
    #[command(visible_alias = "o")]
    Open(OpenCmd),

    /// Mount the trailer preview in mpv ('m' + Enter toggles mute)
    #[command(visible_alias = "p")]
    Preview(PreviewCmd),
}

/// Open the overlay for a movie or TV show
#[derive(Args, Debug)]
pub struct OpenCmd {
    /// TMDB ID
    #[arg(required = true)]
    pub id: u64,

    /// Media type of the item
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeArg,
}

impl OpenCmd {
    pub fn media_id(&self) -> MediaId {
        MediaId {
            media_type: self.media_type.into(),
            id: self.id,
        }
    }
}

/// Play an item's trailer preview with the fixed autoplay policy
#[derive(Args, Debug)]
pub struct PreviewCmd {
    /// TMDB ID
    #[arg(required = true)]
    pub id: u64,

    /// Media type of the item
    #[arg(long, short = 't', value_enum, default_value = "movie")]
    pub media_type: MediaTypeArg,
}

impl PreviewCmd {
    pub fn media_id(&self) -> MediaId {
        MediaId {
            media_type: self.media_type.into(),
            id: self.id,
        }
    }
}

/// Media type argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTypeArg {
    /// Movie
    Movie,
    /// TV show
    Tv,
}

impl From<MediaTypeArg> for MediaType {
    fn from(arg: MediaTypeArg) -> Self {
        match arg {
            MediaTypeArg::Movie => MediaType::Movie,
            MediaTypeArg::Tv => MediaType::Tv,
        }
    }
}

// =============================================================================
// Output Handling
// =============================================================================

/// JSON envelope for machine-readable output
#[derive(Serialize)]
struct JsonOutput<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    exit_code: i32,
}

/// Output formatter respecting --json and --quiet
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput {
                success: true,
                data: Some(data),
                error: None,
                exit_code: 0,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()> {
                success: false,
                data: None,
                error: Some(msg),
                exit_code: code.into(),
            };
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet/JSON mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}
