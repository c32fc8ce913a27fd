//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! Container engine detection and the controller abstraction
//!
//! A [`Controller`] runs the high-level verbs (`run`, `stop`, `update`,
//! `status`, `exist`) against one engine. [`resolve`] picks the engine,
//! [`connect`] reaches its API and hands back the matching controller.

pub mod api;
pub mod docker;
#[cfg(test)]
pub(crate) mod mock;
pub mod podman;
pub mod types;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use api::{BollardApi, EngineApi};
pub use docker::DockerController;
pub use podman::PodmanController;
pub use types::{ContainerDetails, ContainerSpec, ImageDetails};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No suitable container engine found (install docker or podman)")]
    NoEngine,
    #[error("Unsupported platform for podman: {0}")]
    UnsupportedPlatform(String),
    #[error("HOME environment variable not set")]
    HomeNotSet,
    #[error("Cannot reach container engine at {endpoint}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: Box<EngineError>,
    },
    #[error("Container not found: {0}")]
    ContainerNotFound(String),
    #[error("Container {0} is running, stop it first")]
    ContainerRunning(String),
    #[error("Image not found: {0}")]
    ImageNotFound(String),
    #[error("Failed to pull {image}: {message}")]
    PullFailed { image: String, message: String },
    #[error("Engine API error: {0}")]
    Api(#[from] bollard::errors::Error),
}

/// Container engine backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Docker,
    Podman,
}

impl Engine {
    /// Executable probed on `PATH`
    pub fn binary(&self) -> &'static str {
        match self {
            Engine::Docker => "docker",
            Engine::Podman => "podman",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Engine selection from the command line or settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineChoice {
    /// Use docker if installed, else podman
    #[default]
    Auto,
    Docker,
    Podman,
}

/// Running state of the managed container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    Running(ContainerDetails),
    Stopped(ContainerDetails),
    Absent,
}

impl ContainerStatus {
    pub fn details(&self) -> Option<&ContainerDetails> {
        match self {
            ContainerStatus::Running(details) | ContainerStatus::Stopped(details) => Some(details),
            ContainerStatus::Absent => None,
        }
    }
}

impl From<Option<ContainerDetails>> for ContainerStatus {
    fn from(details: Option<ContainerDetails>) -> Self {
        match details {
            Some(d) if d.is_running() => ContainerStatus::Running(d),
            Some(d) => ContainerStatus::Stopped(d),
            None => ContainerStatus::Absent,
        }
    }
}

/// What `run` had to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Created { id: String },
    Restarted,
    AlreadyRunning,
}

/// What `stop` had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
}

/// High-level operations on the managed container
#[async_trait]
pub trait Controller: Send + Sync {
    fn engine(&self) -> Engine;

    /// Address of the engine API in use
    fn endpoint(&self) -> &str;

    /// Whether a container with this name exists, running or not
    async fn exist(&self, name: &str) -> Result<bool, EngineError>;

    async fn status(&self, name: &str) -> Result<ContainerStatus, EngineError>;

    /// Start the container, creating it (and pulling its image) when needed
    async fn run(&self, spec: &ContainerSpec) -> Result<RunOutcome, EngineError>;

    async fn stop(&self, name: &str) -> Result<StopOutcome, EngineError>;

    /// Replace the container's image with a freshly pulled one
    async fn update(&self, spec: &ContainerSpec) -> Result<ImageDetails, EngineError>;
}

/// Find an installed engine, preferring Docker
pub fn detect() -> Result<Engine, EngineError> {
    detect_with(on_path)
}

fn on_path(binary: &str) -> bool {
    which::which(binary).is_ok()
}

fn detect_with(installed: impl Fn(&str) -> bool) -> Result<Engine, EngineError> {
    for engine in [Engine::Docker, Engine::Podman] {
        if installed(engine.binary()) {
            info!("Found {} engine", engine);
            return Ok(engine);
        }
    }

    Err(EngineError::NoEngine)
}

/// Turn an engine choice into a concrete engine
pub fn resolve(choice: EngineChoice) -> Result<Engine, EngineError> {
    resolve_with(choice, on_path)
}

fn resolve_with(
    choice: EngineChoice,
    installed: impl Fn(&str) -> bool,
) -> Result<Engine, EngineError> {
    let engine = match choice {
        EngineChoice::Auto => return detect_with(installed),
        EngineChoice::Docker => Engine::Docker,
        EngineChoice::Podman => Engine::Podman,
    };

    // The API socket may be reachable without the CLI installed
    if !installed(engine.binary()) {
        warn!("{} not found on PATH, trying its API anyway", engine.binary());
    }

    Ok(engine)
}

/// Podman API socket URI for the given OS
pub fn podman_socket_uri(os: &str, home: Option<&str>) -> Result<String, EngineError> {
    match os {
        "linux" => Ok("unix:///var/run/podman/podman.sock".to_string()),
        "macos" | "darwin" => {
            let home = home.filter(|h| !h.is_empty()).ok_or(EngineError::HomeNotSet)?;
            Ok(format!(
                "unix://{}/.local/share/containers/podman/machine/podman.sock",
                home.trim_end_matches('/')
            ))
        }
        other => Err(EngineError::UnsupportedPlatform(other.to_string())),
    }
}

/// Connect to the engine API and build its controller.
///
/// `podman_socket` overrides the per-OS socket URI.
pub async fn connect(
    engine: Engine,
    podman_socket: Option<&str>,
) -> Result<Box<dyn Controller>, EngineError> {
    let (endpoint, client) = match engine {
        Engine::Docker => (api::docker_endpoint(), BollardApi::local()),
        Engine::Podman => {
            let uri = match podman_socket {
                Some(uri) => uri.to_string(),
                None => {
                    let home = std::env::var("HOME").ok();
                    podman_socket_uri(std::env::consts::OS, home.as_deref())?
                }
            };
            let client = BollardApi::unix(&uri);
            (uri, client)
        }
    };

    // A missing socket fails while building the client, before any ping
    let unreachable = |source: EngineError| EngineError::Unreachable {
        endpoint: endpoint.clone(),
        source: Box::new(source),
    };

    let api: Arc<dyn EngineApi> = Arc::new(client.map_err(unreachable)?);
    api.ping().await.map_err(unreachable)?;
    debug!("Connected to {} at {}", engine, api.endpoint());

    Ok(controller_for(engine, api))
}

/// Wrap an engine API in the controller for that engine
pub fn controller_for(engine: Engine, api: Arc<dyn EngineApi>) -> Box<dyn Controller> {
    match engine {
        Engine::Docker => Box::new(DockerController::new(api)),
        Engine::Podman => Box::new(PodmanController::new(api)),
    }
}
