//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! `excalidraw-cli --start` implementation

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use crate::engine::types::short_id;
use crate::engine::{ContainerSpec, Controller, RunOutcome};

pub async fn execute(controller: &dyn Controller, spec: &ContainerSpec) -> Result<()> {
    info!("Starting {} with {}", spec.name, controller.engine());

    let outcome = controller
        .run(spec)
        .await
        .with_context(|| format!("Failed to start container {}", spec.name))?;

    println!("{}", render(spec, &outcome));
    Ok(())
}

fn render(spec: &ContainerSpec, outcome: &RunOutcome) -> String {
    let headline = match outcome {
        RunOutcome::Created { id } => format!("Container {} created ({})", spec.name, short_id(id)),
        RunOutcome::Restarted => format!("Container {} restarted", spec.name),
        RunOutcome::AlreadyRunning => format!("Container {} is already running", spec.name),
    };

    format!("{}\nAccess excalidraw on {}", headline, style(spec.url()).cyan())
}
