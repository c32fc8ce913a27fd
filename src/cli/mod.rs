//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! Command-line interface for excalidraw-cli

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use clap_complete::Shell;
use tracing::debug;

use crate::config::{self, Settings};
use crate::engine::{self, EngineChoice};

pub mod completion;
pub mod flags;
pub mod start;
pub mod status;
pub mod stop;
pub mod update;

/// excalidraw-cli - run Excalidraw locally in a container
#[derive(Parser, Debug)]
#[command(
    name = "excalidraw-cli",
    version,
    about = "Start, stop, update and inspect a local Excalidraw container",
    long_about = None
)]
#[command(group(
    ArgGroup::new("action")
        .args(["start", "status", "update", "stop"])
        .multiple(false)
))]
pub struct Cli {
    /// Start the Excalidraw container
    #[arg(long, visible_alias = "st")]
    pub start: bool,

    /// Show the container status
    #[arg(long, visible_alias = "su")]
    pub status: bool,

    /// Replace the container and pull a fresh image
    #[arg(short = 'u', long)]
    pub update: bool,

    /// Stop the container
    #[arg(long, visible_aliases = ["sp", "exit"])]
    pub stop: bool,

    /// Settings file
    #[arg(short, long, env = "EXCALIDRAW_CLI_CONFIG")]
    pub config: Option<String>,

    /// Container engine to use
    #[arg(short, long, value_enum, env = "EXCALIDRAW_CLI_ENGINE")]
    pub engine: Option<EngineChoice>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,

    /// Don't prompt for confirmation before updating
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL", conflicts_with = "action")]
    pub completions: Option<Shell>,
}

/// The one thing an invocation does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Status,
    Update,
    Stop,
}

impl Cli {
    pub fn action(&self) -> Option<Action> {
        if self.start {
            Some(Action::Start)
        } else if self.status {
            Some(Action::Status)
        } else if self.update {
            Some(Action::Update)
        } else if self.stop {
            Some(Action::Stop)
        } else {
            None
        }
    }
}

/// Execute the requested action
pub async fn execute(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        return completion::execute(shell);
    }

    let Some(action) = cli.action() else {
        bail!("no action given, pass one of --start, --status, --update or --stop (see --help)");
    };

    let config_path = cli.config.as_deref().map(config::expand_home);
    let settings = Settings::load(config_path.as_deref()).context("Failed to load settings")?;
    debug!(?settings, "settings loaded");

    let choice = cli.engine.unwrap_or(settings.engine);
    let engine = engine::resolve(choice)?;
    let controller = engine::connect(engine, settings.podman_socket.as_deref())
        .await
        .with_context(|| format!("Failed to connect to {}", engine))?;

    let spec = settings.container_spec();

    match action {
        Action::Start => start::execute(controller.as_ref(), &spec).await,
        Action::Status => status::execute(controller.as_ref(), &spec, cli.json).await,
        Action::Update => update::execute(controller.as_ref(), &spec, cli.yes).await,
        Action::Stop => stop::execute(controller.as_ref(), &spec).await,
    }
}
