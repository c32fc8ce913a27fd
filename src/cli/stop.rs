//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! `excalidraw-cli --stop` implementation

use anyhow::{Context, Result};

use crate::engine::{ContainerSpec, Controller, StopOutcome};

pub async fn execute(controller: &dyn Controller, spec: &ContainerSpec) -> Result<()> {
    let outcome = controller
        .stop(&spec.name)
        .await
        .with_context(|| format!("Failed to stop container {}", spec.name))?;

    match outcome {
        StopOutcome::Stopped => println!("Container {} stopped", spec.name),
        StopOutcome::AlreadyStopped => println!("Container {} is already stopped", spec.name),
    }

    Ok(())
}
