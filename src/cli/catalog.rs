//! Catalog printing for the `tools` and `prompts` subcommands.

use crate::mcp::prompts::{prompt_catalog, render_prompt};
use crate::tools::ToolRegistry;

/// Print the tool catalog as JSON, or just the names.
pub async fn run_tools_command(names_only: bool) -> anyhow::Result<()> {
    let registry = ToolRegistry::with_masumi_tools();
    let schemas = registry.schemas().await;

    if names_only {
        for schema in &schemas {
            println!("{}", schema.name);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&schemas)?);
    }
    Ok(())
}

/// Print every prompt with its arguments and default text.
pub fn run_prompts_command() -> anyhow::Result<()> {
    let empty = serde_json::Map::new();
    for prompt in prompt_catalog() {
        println!("{} - {}", prompt.name, prompt.description);
        for arg in &prompt.arguments {
            let marker = if arg.required { "required" } else { "optional" };
            println!("  {} ({}): {}", arg.name, marker, arg.description);
        }
        if let Some(text) = render_prompt(prompt.name, &empty) {
            println!();
            for line in text.lines() {
                println!("    {line}");
            }
        }
        println!();
    }
    Ok(())
}
