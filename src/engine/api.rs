//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! Engine API primitives used by the controllers

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions,
    RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::image::{CreateImageOptions, RemoveImageOptions};
use bollard::models::{
    ContainerInspectResponse, ContainerSummary as BollardSummary, HostConfig, ImageInspect,
    PortBinding,
};
use bollard::Docker;
use futures_util::TryStreamExt;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::types::{ContainerDetails, ContainerSpec, ContainerState, ContainerSummary, ImageDetails};
use super::EngineError;

/// Seconds to wait for a response from the engine socket
const SOCKET_TIMEOUT_SECS: u64 = 120;

const DEFAULT_DOCKER_ENDPOINT: &str = "unix:///var/run/docker.sock";

/// The engine operations the controllers are built from.
///
/// Lookups that can miss return `Option`; mutations on a missing
/// container fail with [`EngineError::ContainerNotFound`].
#[async_trait]
pub trait EngineApi: Send + Sync {
    /// Address of the engine API, for diagnostics
    fn endpoint(&self) -> &str;

    async fn ping(&self) -> Result<(), EngineError>;

    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>, EngineError>;

    /// Inspect a container by name or ID
    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerDetails>, EngineError>;

    /// Create the container and return its ID
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError>;

    async fn start_container(&self, id: &str) -> Result<(), EngineError>;

    /// Stop a container; `None` leaves the grace period to the engine
    async fn stop_container(&self, id: &str, timeout_secs: Option<i64>) -> Result<(), EngineError>;

    async fn remove_container(&self, id: &str, force: bool) -> Result<(), EngineError>;

    async fn inspect_image(&self, image: &str) -> Result<Option<ImageDetails>, EngineError>;

    async fn remove_image(&self, image: &str) -> Result<(), EngineError>;

    /// Pull an image, waiting for the pull to finish
    async fn pull_image(&self, image: &str) -> Result<(), EngineError>;
}

/// [`EngineApi`] over a `bollard` client.
///
/// Podman serves the Docker-compatible API on its socket, so the same
/// client drives both engines.
#[derive(Clone)]
pub struct BollardApi {
    docker: Docker,
    endpoint: String,
}

impl BollardApi {
    /// Connect to the Docker daemon named by `DOCKER_HOST` (unix, tcp or
    /// http), or to the local socket when it is unset
    pub fn local() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_defaults()?;

        Ok(Self {
            docker,
            endpoint: docker_endpoint(),
        })
    }

    /// Connect to an engine listening on a Unix socket URI
    pub fn unix(uri: &str) -> Result<Self, EngineError> {
        let docker = Docker::connect_with_unix(uri, SOCKET_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)?;

        Ok(Self {
            docker,
            endpoint: uri.to_string(),
        })
    }
}

/// Docker API address in use: `DOCKER_HOST`, else the local socket
pub fn docker_endpoint() -> String {
    std::env::var("DOCKER_HOST")
        .ok()
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_DOCKER_ENDPOINT.to_string())
}

fn has_status(err: &BollardError, code: u16) -> bool {
    matches!(err, BollardError::DockerResponseServerError { status_code, .. } if *status_code == code)
}

#[async_trait]
impl EngineApi for BollardApi {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn ping(&self) -> Result<(), EngineError> {
        self.docker.ping().await?;
        Ok(())
    }

    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>, EngineError> {
        let options = ListContainersOptions::<String> {
            all,
            ..Default::default()
        };

        let containers = self.docker.list_containers(Some(options)).await?;
        Ok(containers.into_iter().map(summary_from).collect())
    }

    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerDetails>, EngineError> {
        match self
            .docker
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
        {
            Ok(response) => Ok(Some(details_from(response))),
            Err(e) if has_status(&e, 404) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        let port_key = spec.port_key();

        let host_config = HostConfig {
            port_bindings: Some(HashMap::from([(
                port_key.clone(),
                Some(vec![PortBinding {
                    host_ip: Some(spec.host_ip.clone()),
                    host_port: Some(spec.host_port.to_string()),
                }]),
            )])),
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.image.clone()),
            exposed_ports: Some(HashMap::from([(port_key, HashMap::new())])),
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };

        let response = self.docker.create_container(Some(options), config).await?;
        for warning in &response.warnings {
            warn!(container = %spec.name, "{}", warning);
        }

        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        match self
            .docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
        {
            Ok(()) => Ok(()),
            // Already started
            Err(e) if has_status(&e, 304) => Ok(()),
            Err(e) if has_status(&e, 404) => Err(EngineError::ContainerNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn stop_container(&self, id: &str, timeout_secs: Option<i64>) -> Result<(), EngineError> {
        let options = timeout_secs.map(|t| StopContainerOptions { t });

        match self.docker.stop_container(id, options).await {
            Ok(()) => Ok(()),
            // Already stopped
            Err(e) if has_status(&e, 304) => Ok(()),
            Err(e) if has_status(&e, 404) => Err(EngineError::ContainerNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_container(&self, id: &str, force: bool) -> Result<(), EngineError> {
        let options = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        match self.docker.remove_container(id, Some(options)).await {
            Ok(()) => Ok(()),
            Err(e) if has_status(&e, 404) => Err(EngineError::ContainerNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn inspect_image(&self, image: &str) -> Result<Option<ImageDetails>, EngineError> {
        match self.docker.inspect_image(image).await {
            Ok(inspect) => Ok(Some(image_from(inspect))),
            Err(e) if has_status(&e, 404) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_image(&self, image: &str) -> Result<(), EngineError> {
        let options = RemoveImageOptions {
            force: false,
            noprune: false,
        };

        match self.docker.remove_image(image, Some(options), None).await {
            Ok(deleted) => {
                debug!(%image, layers = deleted.len(), "image removed");
                Ok(())
            }
            Err(e) if has_status(&e, 404) => Err(EngineError::ImageNotFound(image.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn pull_image(&self, image: &str) -> Result<(), EngineError> {
        let options = CreateImageOptions {
            from_image: image.to_string(),
            ..Default::default()
        };

        let mut progress = Box::pin(self.docker.create_image(Some(options), None, None));

        while let Some(info) = progress.try_next().await.map_err(|e| EngineError::PullFailed {
            image: image.to_string(),
            message: e.to_string(),
        })? {
            if let Some(status) = info.status {
                debug!(%image, layer = info.id.as_deref().unwrap_or("-"), "{}", status);
            }
        }

        Ok(())
    }
}

fn summary_from(summary: BollardSummary) -> ContainerSummary {
    ContainerSummary {
        id: summary.id.unwrap_or_default(),
        names: summary.names.unwrap_or_default(),
        image: summary.image.unwrap_or_default(),
        state: summary
            .state
            .as_deref()
            .map(ContainerState::parse)
            .unwrap_or_else(|| ContainerState::Unknown("unknown".to_string())),
    }
}

fn details_from(response: ContainerInspectResponse) -> ContainerDetails {
    let state = response.state.as_ref();

    let running = state.and_then(|s| s.running).unwrap_or(false);
    let status = state
        .and_then(|s| s.status.as_ref())
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty());

    let state_value = match (running, status) {
        (true, _) => ContainerState::Running,
        (false, Some(s)) => ContainerState::parse(&s),
        (false, None) => ContainerState::Unknown("unknown".to_string()),
    };

    let health = state
        .and_then(|s| s.health.as_ref())
        .and_then(|h| h.status.as_ref())
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty() && s != "none");

    ContainerDetails {
        id: response.id.clone().unwrap_or_default(),
        name: response
            .name
            .as_deref()
            .unwrap_or_default()
            .trim_start_matches('/')
            .to_string(),
        image: response
            .config
            .as_ref()
            .and_then(|c| c.image.clone())
            .unwrap_or_default(),
        state: state_value,
        health,
        started_at: state.and_then(|s| s.started_at.clone()),
    }
}

fn image_from(inspect: ImageInspect) -> ImageDetails {
    ImageDetails {
        id: inspect.id.unwrap_or_default(),
        tags: inspect.repo_tags.unwrap_or_default(),
        architecture: inspect.architecture.unwrap_or_default(),
        os: inspect.os.unwrap_or_default(),
        created: inspect.created.unwrap_or_default(),
        size: inspect.size.map(|s| s.max(0) as u64).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_honours_tcp_docker_host() {
        let previous = std::env::var_os("DOCKER_HOST");
        std::env::set_var("DOCKER_HOST", "tcp://127.0.0.1:2375");
        let api = BollardApi::local();
        match previous {
            Some(host) => std::env::set_var("DOCKER_HOST", host),
            None => std::env::remove_var("DOCKER_HOST"),
        }

        assert_eq!(api.unwrap().endpoint(), "tcp://127.0.0.1:2375");
    }

    #[test]
    fn test_unix_missing_socket_fails() {
        assert!(BollardApi::unix("unix:///nonexistent/podman.sock").is_err());
    }
}
