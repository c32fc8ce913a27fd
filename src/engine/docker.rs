//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! Docker controller
//!
//! Docker reports container names with a leading `/`, so lookups go
//! through the container list and match on the bare name.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::api::EngineApi;
use super::types::{short_id, ContainerDetails, ContainerSpec, ImageDetails};
use super::{ContainerStatus, Controller, Engine, EngineError, RunOutcome, StopOutcome};

pub struct DockerController {
    api: Arc<dyn EngineApi>,
}

impl DockerController {
    pub fn new(api: Arc<dyn EngineApi>) -> Self {
        Self { api }
    }

    /// Look a container up by name among all containers
    async fn find(&self, name: &str) -> Result<Option<ContainerDetails>, EngineError> {
        let containers = self.api.list_containers(true).await?;

        match containers.iter().find(|c| c.has_name(name)) {
            Some(summary) => {
                debug!(
                    id = short_id(&summary.id),
                    image = %summary.image,
                    state = summary.state.as_str(),
                    "found container {}",
                    name
                );
                self.api.inspect_container(&summary.id).await
            }
            None => Ok(None),
        }
    }

    /// Pull the image unless it is already present locally
    async fn ensure_image(&self, image: &str) -> Result<(), EngineError> {
        if self.api.inspect_image(image).await?.is_none() {
            info!("Image {} not present locally, pulling now", image);
            self.api.pull_image(image).await?;
            info!("Image {} pulled", image);
        }
        Ok(())
    }
}

#[async_trait]
impl Controller for DockerController {
    fn engine(&self) -> Engine {
        Engine::Docker
    }

    fn endpoint(&self) -> &str {
        self.api.endpoint()
    }

    async fn exist(&self, name: &str) -> Result<bool, EngineError> {
        let containers = self.api.list_containers(true).await?;
        Ok(containers.iter().any(|c| c.has_name(name)))
    }

    async fn status(&self, name: &str) -> Result<ContainerStatus, EngineError> {
        Ok(self.find(name).await?.into())
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<RunOutcome, EngineError> {
        self.ensure_image(&spec.image).await?;

        if let Some(container) = self.find(&spec.name).await? {
            if container.is_running() {
                info!("Container {} is already running", spec.name);
                return Ok(RunOutcome::AlreadyRunning);
            }

            if container.image != spec.image {
                warn!(
                    "Container {} runs {} rather than {}, run an update to replace it",
                    spec.name, container.image, spec.image
                );
            }

            info!("Container {} already created, restarting it", spec.name);
            self.api.start_container(&container.id).await?;
            return Ok(RunOutcome::Restarted);
        }

        let id = self.api.create_container(spec).await?;
        info!("Container created: {}", short_id(&id));

        self.api.start_container(&id).await?;
        info!("Container {} started", short_id(&id));

        Ok(RunOutcome::Created { id })
    }

    async fn stop(&self, name: &str) -> Result<StopOutcome, EngineError> {
        let container = self
            .find(name)
            .await?
            .ok_or_else(|| EngineError::ContainerNotFound(name.to_string()))?;

        if !container.is_running() {
            info!("Container {} is not running", name);
            return Ok(StopOutcome::AlreadyStopped);
        }

        self.api.stop_container(&container.id, None).await?;
        info!("Container {} stopped", name);
        Ok(StopOutcome::Stopped)
    }

    async fn update(&self, spec: &ContainerSpec) -> Result<ImageDetails, EngineError> {
        if let Some(container) = self.find(&spec.name).await? {
            info!("Old container found ({})", short_id(&container.id));
            if container.is_running() {
                self.api.stop_container(&container.id, None).await?;
                info!("Container stopped");
            }
            self.api.remove_container(&container.id, false).await?;
            info!("Container removed");
        }

        if self.api.inspect_image(&spec.image).await?.is_some() {
            info!("Old image found");
            self.api.remove_image(&spec.image).await?;
            info!("Image removed");
        }

        self.api.pull_image(&spec.image).await?;
        info!("Image {} pulled", spec.image);

        self.api
            .inspect_image(&spec.image)
            .await?
            .ok_or_else(|| EngineError::ImageNotFound(spec.image.clone()))
    }
}
