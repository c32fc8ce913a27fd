//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! `excalidraw-cli --status` implementation

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::engine::types::short_id;
use crate::engine::{ContainerSpec, ContainerStatus, Controller, Engine};

/// Status as printed with `--json`
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub name: String,
    pub engine: Engine,
    pub endpoint: String,
    /// `running`, `absent`, or the engine's state for stopped containers
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    pub url: String,
}

impl StatusReport {
    pub fn new(
        status: &ContainerStatus,
        spec: &ContainerSpec,
        engine: Engine,
        endpoint: &str,
    ) -> Self {
        let details = status.details();

        Self {
            name: spec.name.clone(),
            engine,
            endpoint: endpoint.to_string(),
            state: details
                .map(|d| d.state.as_str().to_string())
                .unwrap_or_else(|| "absent".to_string()),
            health: details.and_then(|d| d.health.clone()),
            id: details.map(|d| d.id.clone()),
            image: details.map(|d| d.image.clone()),
            started_at: details.and_then(|d| d.started_at.clone()),
            url: spec.url(),
        }
    }

    fn rows(&self) -> Vec<FieldRow> {
        let mut rows = vec![
            FieldRow::new("Name", &self.name),
            FieldRow::new("Engine", &format!("{} ({})", self.engine, self.endpoint)),
            FieldRow::new("State", &self.state),
        ];

        if let Some(health) = &self.health {
            rows.push(FieldRow::new("Health", health));
        }
        if let Some(id) = &self.id {
            rows.push(FieldRow::new("ID", short_id(id)));
        }
        if let Some(image) = &self.image {
            rows.push(FieldRow::new("Image", image));
        }
        if let Some(started_at) = &self.started_at {
            rows.push(FieldRow::new("Started", started_at));
        }
        rows.push(FieldRow::new("URL", &self.url));

        rows
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

impl FieldRow {
    fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

pub async fn execute(controller: &dyn Controller, spec: &ContainerSpec, json: bool) -> Result<()> {
    let status = controller
        .status(&spec.name)
        .await
        .with_context(|| format!("Failed to get status of {}", spec.name))?;

    let report = StatusReport::new(&status, spec, controller.engine(), controller.endpoint());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render(&status, &report));
    }
    Ok(())
}

/// Human-readable status: a headline, then the field table when the
/// container exists
fn render(status: &ContainerStatus, report: &StatusReport) -> String {
    match status {
        ContainerStatus::Running(_) => format!(
            "{} {} is running\n{}",
            style("●").green(),
            report.name,
            Table::new(report.rows())
        ),
        ContainerStatus::Stopped(_) => format!(
            "{} {} is stopped\n{}",
            style("●").yellow(),
            report.name,
            Table::new(report.rows())
        ),
        ContainerStatus::Absent => format!(
            "{} {} is not created, start it with --start",
            style("○").dim(),
            report.name
        ),
    }
}
