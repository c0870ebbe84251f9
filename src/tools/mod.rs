//! Tool system.
//!
//! Each marketplace operation is a [`Tool`]: a name, a JSON Schema for its
//! arguments, and an async `execute` that receives the shared
//! [`ExecutionContext`](crate::context::ExecutionContext). Tools never call
//! each other; the MCP server dispatches to them through the [`ToolRegistry`].

pub mod builtin;
pub mod format;
pub mod redaction;

mod registry;
mod tool;

pub use registry::ToolRegistry;
pub use tool::{
    ErrorKind, Tool, ToolError, ToolOutput, ToolSchema, optional_bool, optional_i64, optional_str,
    require_param, require_str, validate_tool_schema,
};
