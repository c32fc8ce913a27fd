//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! excalidraw-cli - run Excalidraw locally in a container
//!
//! Starts, stops, updates and reports on a single Excalidraw container
//! through whichever engine is installed, Docker or Podman.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;
mod engine;

use cli::Cli;

fn main() -> ExitCode {
    // Parse CLI arguments, accepting Go-style single-dash flags
    let cli = Cli::parse_from(cli::flags::normalize(std::env::args_os()));

    // Initialize logging
    let default_filter = if cli.verbose {
        format!("info,{}=debug", env!("CARGO_CRATE_NAME"))
    } else {
        "info".to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // One invocation drives one container, a single thread is enough
    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(cli::execute(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
