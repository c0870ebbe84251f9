//! Masumi MCP - Main entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use masumi_mcp::{
    cli::{Cli, Command, run_prompts_command, run_tools_command},
    config::Config,
    context::ExecutionContext,
    mcp::McpServer,
    tools::ToolRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Catalog commands need no configuration or logging
    match &cli.command {
        Some(Command::Tools { names }) => return run_tools_command(*names).await,
        Some(Command::Prompts) => return run_prompts_command(),
        None | Some(Command::Serve) => {}
    }

    // Load .env (or the requested file) before reading configuration
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("masumi_mcp=info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };
    config.warn_on_gaps();
    tracing::info!(
        registry = %config.registry_base_url,
        payment = %config.payment_base_url,
        network = %config.network,
        "Configuration loaded"
    );

    let ctx = Arc::new(ExecutionContext::from_config(&config)?);
    let tools = ToolRegistry::with_masumi_tools();
    let server = Arc::new(McpServer::new(tools, ctx));

    server.serve_stdio().await?;
    Ok(())
}
