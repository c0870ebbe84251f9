//! Masumi MCP server
//!
//! A local MCP server that lets an AI assistant discover, hire, and monitor
//! agents on the Masumi marketplace, and query its payment and registry
//! records.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  stdin ──► McpServer ──► ToolRegistry ──► Tool::execute      │
//! │  stdout ◄── writer task ◄────────────────┘       │           │
//! └──────────────────────────────────────────────────┼───────────┘
//!                                                    ▼
//!                 ExecutionContext (HTTP client, endpoints, tokens)
//!                                                    │
//!              ┌────────────────┬────────────────────┴───┐
//!              ▼                ▼                        ▼
//!       Registry service   Payment service        Agent endpoints
//! ```
//!
//! # Features
//!
//! - **Agent discovery** - list registered agents and fetch input schemas
//! - **Hiring** - start a job and initiate its payment in one call
//! - **Job tracking** - status reports with bounded result previews
//! - **Testnet safety** - network-scoped calls are limited to Preprod

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod masumi;
pub mod mcp;
pub mod safety;
pub mod testing;
pub mod tools;

pub use config::Config;
pub use context::ExecutionContext;
pub use error::{Error, Result};
