//! reelview - media detail overlay engine
//!
//! Scriptable driver for the overlay core: open an item's detail view or
//! play its trailer preview.
//!
//! ```bash
//! reelview open -t movie 603 --json
//! reelview preview -t tv 1396
//! ```

// Library surface re-declared for the binary; not all of it is reachable
// from the CLI commands
#![allow(dead_code)]

mod api;
mod cache;
mod cli;
mod commands;
mod config;
mod models;
mod overlay;
mod player;

use clap::Parser;

use crate::cli::{Cli, Command, ExitCode, Output};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = Output::new(&cli);

    let exit_code: ExitCode = match cli.command {
        Command::Open(cmd) => commands::open_cmd(cmd, &output).await,
        Command::Preview(cmd) => commands::preview_cmd(cmd, &output).await,
    };

    std::process::exit(exit_code.into());
}
