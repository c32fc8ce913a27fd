//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! Settings file handling
//!
//! Settings live in `<config dir>/excalidraw-cli/config.toml`. Every key
//! is optional; a missing default file means built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::engine::types::{
    ContainerSpec, DEFAULT_CONTAINER_NAME, DEFAULT_CONTAINER_PORT, DEFAULT_HOST_IP,
    DEFAULT_HOST_PORT, DEFAULT_IMAGE,
};
use crate::engine::EngineChoice;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid settings in {}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Engine to use when `--engine` is not given
    pub engine: EngineChoice,
    pub image: String,
    pub container_name: String,
    pub host_ip: String,
    pub host_port: u16,
    pub container_port: u16,
    /// Podman API socket URI, replacing the per-OS default
    pub podman_socket: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineChoice::Auto,
            image: DEFAULT_IMAGE.to_string(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            host_ip: DEFAULT_HOST_IP.to_string(),
            host_port: DEFAULT_HOST_PORT,
            container_port: DEFAULT_CONTAINER_PORT,
            podman_socket: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist; the default one may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let path = default_path()?;
                if path.exists() {
                    Self::read(&path)
                } else {
                    debug!("No settings file at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec {
            image: self.image.clone(),
            name: self.container_name.clone(),
            host_ip: self.host_ip.clone(),
            host_port: self.host_port,
            container_port: self.container_port,
        }
    }
}

pub fn default_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("excalidraw-cli").join("config.toml"))
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
