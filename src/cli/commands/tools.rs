//! Tools command: show what the model will be offered.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::configured_capabilities;
use crate::tools::{ToolKind, ToolRegistry};
use anyhow::Result;
use console::style;

/// Run the tools command.
pub fn run_tools(json: bool, settings: &Settings) -> Result<()> {
    preflight::check(Operation::ListTools, settings)?;
    let registry = ToolRegistry::new(configured_capabilities(settings));

    if json {
        println!("{}", serde_json::to_string_pretty(&registry.schemas())?);
        return Ok(());
    }

    Output::header("Enabled tools");
    for schema in registry.schemas() {
        Output::list_item(&format!(
            "{} {}",
            style(&schema.name).bold(),
            style(format!("({})", schema.required().join(", "))).dim()
        ));
        println!("    {}", schema.description);
    }

    let disabled: Vec<&str> = ToolKind::ALL
        .into_iter()
        .filter(|kind| !registry.is_enabled(*kind))
        .map(ToolKind::name)
        .collect();
    if !disabled.is_empty() {
        println!();
        Output::kv("Not configured", &disabled.join(", "));
    }

    Ok(())
}
