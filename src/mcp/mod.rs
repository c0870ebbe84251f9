//! Model Context Protocol surface: JSON-RPC types, the stdio server, and
//! the guidance prompts it serves.

pub mod prompts;
pub mod protocol;
mod server;

pub use server::{McpServer, SERVER_NAME};
