//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! In-memory engine that records every call, for controller tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::api::EngineApi;
use super::types::{ContainerDetails, ContainerSpec, ContainerState, ContainerSummary, ImageDetails};
use super::EngineError;

pub const CONTAINER_ID: &str = "4f1c0ffee0ddba11";
pub const CREATED_ID: &str = "9e7a5eedfacade00";

/// A call made against the mock engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Ping,
    ListContainers { all: bool },
    InspectContainer(String),
    CreateContainer(String),
    StartContainer(String),
    StopContainer(String, Option<i64>),
    RemoveContainer(String, bool),
    InspectImage(String),
    RemoveImage(String),
    PullImage(String),
}

impl Call {
    /// Whether the call changes engine state
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Call::Ping | Call::ListContainers { .. } | Call::InspectContainer(_) | Call::InspectImage(_)
        )
    }
}

#[derive(Default)]
struct World {
    container: Option<ContainerDetails>,
    image: Option<ImageDetails>,
    /// Container disappears before a remove reaches it
    vanishes: bool,
}

#[derive(Default)]
pub struct MockApi {
    world: Mutex<World>,
    calls: Mutex<Vec<Call>>,
}

pub fn details(name: &str, state: ContainerState) -> ContainerDetails {
    ContainerDetails {
        id: CONTAINER_ID.to_string(),
        name: name.to_string(),
        image: ContainerSpec::default().image,
        state,
        health: None,
        started_at: None,
    }
}

pub fn image(name: &str) -> ImageDetails {
    ImageDetails {
        id: "sha256:a11ce5b0b0000000".to_string(),
        tags: vec![name.to_string()],
        architecture: "amd64".to_string(),
        os: "linux".to_string(),
        created: "2026-01-01T00:00:00Z".to_string(),
        size: 20_000_000,
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, name: &str) -> Self {
        self.world.lock().unwrap().image = Some(image(name));
        self
    }

    pub fn with_container(self, name: &str, state: ContainerState) -> Self {
        self.world.lock().unwrap().container = Some(details(name, state));
        self
    }

    /// Container created from another image than the default spec's
    pub fn with_container_from(self, name: &str, state: ContainerState, image: &str) -> Self {
        self.world.lock().unwrap().container = Some(ContainerDetails {
            image: image.to_string(),
            ..details(name, state)
        });
        self
    }

    /// Make removals report the container as already gone
    pub fn vanishing(self) -> Self {
        self.world.lock().unwrap().vanishes = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that changed engine state, in order
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn container(&self) -> Option<ContainerDetails> {
        self.world.lock().unwrap().container.clone()
    }

    pub fn has_image(&self) -> bool {
        self.world.lock().unwrap().image.is_some()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn matches(container: &ContainerDetails, key: &str) -> bool {
        container.id == key || container.name == key
    }

    fn set_state(&self, key: &str, state: ContainerState) -> Result<(), EngineError> {
        let mut world = self.world.lock().unwrap();
        match world.container.as_mut() {
            Some(c) if Self::matches(c, key) => {
                c.state = state;
                Ok(())
            }
            _ => Err(EngineError::ContainerNotFound(key.to_string())),
        }
    }
}

#[async_trait]
impl EngineApi for MockApi {
    fn endpoint(&self) -> &str {
        "mock://engine"
    }

    async fn ping(&self) -> Result<(), EngineError> {
        self.record(Call::Ping);
        Ok(())
    }

    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>, EngineError> {
        self.record(Call::ListContainers { all });
        let world = self.world.lock().unwrap();
        Ok(world
            .container
            .iter()
            .filter(|c| all || c.is_running())
            .map(|c| ContainerSummary {
                id: c.id.clone(),
                names: vec![format!("/{}", c.name)],
                image: c.image.clone(),
                state: c.state.clone(),
            })
            .collect())
    }

    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerDetails>, EngineError> {
        self.record(Call::InspectContainer(name.to_string()));
        let world = self.world.lock().unwrap();
        Ok(world.container.clone().filter(|c| Self::matches(c, name)))
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        self.record(Call::CreateContainer(spec.name.clone()));
        let mut world = self.world.lock().unwrap();
        if world.image.is_none() {
            return Err(EngineError::ImageNotFound(spec.image.clone()));
        }
        world.container = Some(ContainerDetails {
            id: CREATED_ID.to_string(),
            ..details(&spec.name, ContainerState::Created)
        });
        Ok(CREATED_ID.to_string())
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.record(Call::StartContainer(id.to_string()));
        self.set_state(id, ContainerState::Running)
    }

    async fn stop_container(&self, id: &str, timeout_secs: Option<i64>) -> Result<(), EngineError> {
        self.record(Call::StopContainer(id.to_string(), timeout_secs));
        self.set_state(id, ContainerState::Exited)
    }

    async fn remove_container(&self, id: &str, force: bool) -> Result<(), EngineError> {
        self.record(Call::RemoveContainer(id.to_string(), force));
        let mut world = self.world.lock().unwrap();
        if world.vanishes {
            world.container = None;
            return Err(EngineError::ContainerNotFound(id.to_string()));
        }
        let running = match world.container.as_ref() {
            Some(c) if Self::matches(c, id) => c.is_running(),
            _ => return Err(EngineError::ContainerNotFound(id.to_string())),
        };
        if running && !force {
            return Err(EngineError::ContainerRunning(id.to_string()));
        }
        world.container = None;
        Ok(())
    }

    async fn inspect_image(&self, image: &str) -> Result<Option<ImageDetails>, EngineError> {
        self.record(Call::InspectImage(image.to_string()));
        Ok(self.world.lock().unwrap().image.clone())
    }

    async fn remove_image(&self, image: &str) -> Result<(), EngineError> {
        self.record(Call::RemoveImage(image.to_string()));
        let mut world = self.world.lock().unwrap();
        // Still referenced by a container
        if world.container.as_ref().is_some_and(|c| c.image == image) {
            return Err(EngineError::ContainerRunning(image.to_string()));
        }
        world
            .image
            .take()
            .map(|_| ())
            .ok_or_else(|| EngineError::ImageNotFound(image.to_string()))
    }

    async fn pull_image(&self, image: &str) -> Result<(), EngineError> {
        self.record(Call::PullImage(image.to_string()));
        self.world.lock().unwrap().image = Some(self::image(image));
        Ok(())
    }
}
