//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! Container and image descriptions shared by both engine backends

use serde::Serialize;

/// Image run when no settings override it
pub const DEFAULT_IMAGE: &str = "excalidraw/excalidraw:latest";
/// Name given to the managed container
pub const DEFAULT_CONTAINER_NAME: &str = "excalidraw";
/// Host address the web UI is published on
pub const DEFAULT_HOST_IP: &str = "127.0.0.1";
/// Host port the web UI is published on
pub const DEFAULT_HOST_PORT: u16 = 5000;
/// Port the image serves on inside the container
pub const DEFAULT_CONTAINER_PORT: u16 = 80;

/// Everything needed to create the managed container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    pub name: String,
    pub host_ip: String,
    pub host_port: u16,
    pub container_port: u16,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            name: DEFAULT_CONTAINER_NAME.to_string(),
            host_ip: DEFAULT_HOST_IP.to_string(),
            host_port: DEFAULT_HOST_PORT,
            container_port: DEFAULT_CONTAINER_PORT,
        }
    }
}

impl ContainerSpec {
    /// Port key in engine notation, e.g. `80/tcp`
    pub fn port_key(&self) -> String {
        format!("{}/tcp", self.container_port)
    }

    /// URL the web UI is reachable on once the container runs
    pub fn url(&self) -> String {
        let host = match self.host_ip.as_str() {
            "127.0.0.1" | "0.0.0.0" | "" => "localhost",
            ip => ip,
        };
        format!("http://{}:{}/", host, self.host_port)
    }
}

/// Container state as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Exited,
    Dead,
    Unknown(String),
}

impl ContainerState {
    pub fn as_str(&self) -> &str {
        match self {
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Unknown(s) => s,
        }
    }

    /// Parse an engine state string. Podman reports `stopped` and
    /// `configured` where Docker says `exited` and `created`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "created" | "configured" | "initialized" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "exited" | "stopped" => ContainerState::Exited,
            "dead" | "removing" => ContainerState::Dead,
            _ => ContainerState::Unknown(s.to_string()),
        }
    }
}

/// Entry of a container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    /// Names as the engine reports them; Docker prefixes each with `/`
    pub names: Vec<String>,
    pub image: String,
    pub state: ContainerState,
}

impl ContainerSummary {
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.trim_start_matches('/') == name)
    }
}

/// Result of inspecting a single container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDetails {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    /// Healthcheck status, only when the image defines one
    pub health: Option<String>,
    pub started_at: Option<String>,
}

impl ContainerDetails {
    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }
}

/// Result of inspecting an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDetails {
    pub id: String,
    pub tags: Vec<String>,
    pub architecture: String,
    pub os: String,
    pub created: String,
    pub size: u64,
}

/// First twelve characters of an engine ID
pub fn short_id(id: &str) -> &str {
    let id = id.strip_prefix("sha256:").unwrap_or(id);
    id.get(..12).unwrap_or(id)
}
