//! CLI command handling.
//!
//! Provides subcommands for:
//! - Running the MCP server on stdio (`serve`, the default)
//! - Printing the tool catalog (`tools`)
//! - Printing the prompt catalog (`prompts`)

mod catalog;

pub use catalog::{run_prompts_command, run_tools_command};

use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "masumi-mcp")]
#[command(about = "MCP server for discovering, hiring, and monitoring Masumi agents")]
#[command(
    long_about = "Masumi MCP exposes the Masumi marketplace to an AI assistant over stdio.\nExamples:\n  masumi-mcp  # Serve on stdin/stdout\n  masumi-mcp tools  # Print the tool catalog"
)]
#[command(version)]
#[command(color = ColorChoice::Auto)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Environment file to load before reading configuration (default: .env)
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve MCP on stdin/stdout (default if no subcommand given)
    #[command(
        about = "Run the stdio server",
        long_about = "Reads JSON-RPC requests from stdin and writes responses to stdout.\nLogs go to stderr.\nExample: masumi-mcp serve"
    )]
    Serve,

    /// Print every tool with its description and input schema
    #[command(
        about = "Print the tool catalog",
        long_about = "Prints every tool's name, description, and input schema as JSON.\nExample: masumi-mcp tools --names"
    )]
    Tools {
        /// Print tool names only
        #[arg(long)]
        names: bool,
    },

    /// Print every guidance prompt
    #[command(about = "Print the prompt catalog")]
    Prompts,
}
