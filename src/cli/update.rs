//! SPDX-License-Identifier: MIT OR AGPL-3.0-or-later
//! `excalidraw-cli --update` implementation

use anyhow::{Context, Result};
use bytesize::ByteSize;
use console::style;
use dialoguer::Confirm;

use crate::engine::types::short_id;
use crate::engine::{ContainerSpec, Controller};

pub async fn execute(controller: &dyn Controller, spec: &ContainerSpec, assume_yes: bool) -> Result<()> {
    if !assume_yes {
        let exists = controller
            .exist(&spec.name)
            .await
            .with_context(|| format!("Failed to look up container {}", spec.name))?;

        let prompt = if exists {
            format!(
                "Remove container {} and pull a fresh {}?",
                spec.name, spec.image
            )
        } else {
            format!("Pull a fresh {}?", spec.image)
        };

        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Confirmation failed, pass --yes to update without prompting")?;

        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let image = controller
        .update(spec)
        .await
        .with_context(|| format!("Failed to update {}", spec.image))?;

    println!("{} {}", style("Image pulled:").green().bold(), spec.image);
    println!("  ID:           {}", short_id(&image.id));
    println!("  Tags:         {}", image.tags.join(", "));
    println!("  Architecture: {}", image.architecture);
    println!("  OS:           {}", image.os);
    println!("  Created:      {}", image.created);
    println!("  Size:         {}", ByteSize(image.size));
    println!();
    println!("Run with --start to launch the updated container");

    Ok(())
}
