//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! Podman controller, driven over the Podman API socket

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::api::EngineApi;
use super::types::{short_id, ContainerSpec, ImageDetails};
use super::{ContainerStatus, Controller, Engine, EngineError, RunOutcome, StopOutcome};

/// Grace period before Podman kills the container on stop, in seconds
pub const STOP_TIMEOUT_SECS: i64 = 1;

pub struct PodmanController {
    api: Arc<dyn EngineApi>,
}

impl PodmanController {
    pub fn new(api: Arc<dyn EngineApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Controller for PodmanController {
    fn engine(&self) -> Engine {
        Engine::Podman
    }

    fn endpoint(&self) -> &str {
        self.api.endpoint()
    }

    async fn exist(&self, name: &str) -> Result<bool, EngineError> {
        Ok(self.api.inspect_container(name).await?.is_some())
    }

    async fn status(&self, name: &str) -> Result<ContainerStatus, EngineError> {
        Ok(self.api.inspect_container(name).await?.into())
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<RunOutcome, EngineError> {
        match self.status(&spec.name).await? {
            ContainerStatus::Running(_) => {
                info!("Container {} is already running, nothing to do", spec.name);
                Ok(RunOutcome::AlreadyRunning)
            }
            ContainerStatus::Stopped(_) => {
                info!("Container {} already exists, re-starting it", spec.name);
                self.api.start_container(&spec.name).await?;
                Ok(RunOutcome::Restarted)
            }
            ContainerStatus::Absent => {
                if self.api.inspect_image(&spec.image).await?.is_none() {
                    info!("Image {} does not exist yet, pulling it", spec.image);
                    self.api.pull_image(&spec.image).await?;
                }

                let id = self.api.create_container(spec).await?;
                self.api.start_container(&id).await?;
                info!("Container started with ID {} and name {}", short_id(&id), spec.name);

                Ok(RunOutcome::Created { id })
            }
        }
    }

    async fn stop(&self, name: &str) -> Result<StopOutcome, EngineError> {
        match self.status(name).await? {
            ContainerStatus::Absent => Err(EngineError::ContainerNotFound(name.to_string())),
            ContainerStatus::Stopped(_) => {
                info!("Container {} is already stopped", name);
                Ok(StopOutcome::AlreadyStopped)
            }
            ContainerStatus::Running(_) => {
                self.api.stop_container(name, Some(STOP_TIMEOUT_SECS)).await?;
                info!("Container {} stopped", name);
                Ok(StopOutcome::Stopped)
            }
        }
    }

    async fn update(&self, spec: &ContainerSpec) -> Result<ImageDetails, EngineError> {
        match self.status(&spec.name).await? {
            ContainerStatus::Running(_) => {
                return Err(EngineError::ContainerRunning(spec.name.clone()));
            }
            ContainerStatus::Stopped(_) => {
                info!("Found existing container {}", spec.name);
                match self.api.remove_container(&spec.name, true).await {
                    Ok(()) => info!("Container removed"),
                    // Removed between inspect and remove
                    Err(EngineError::ContainerNotFound(_)) => debug!("Container already gone"),
                    Err(e) => return Err(e),
                }
            }
            ContainerStatus::Absent => {}
        }

        // Pulling moves the tag to the new image
        info!("Pulling image {}", spec.image);
        self.api.pull_image(&spec.image).await?;

        self.api
            .inspect_image(&spec.image)
            .await?
            .ok_or_else(|| EngineError::ImageNotFound(spec.image.clone()))
    }
}
