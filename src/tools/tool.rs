//! Tool trait and types.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::ExecutionContext;
use crate::error::SafetyError;

/// Coarse category of a [`ToolError`], for callers that branch on the
/// failure class rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigurationMissing,
    SafetyRejected,
    ParameterInvalid,
    RemoteHttp,
    RemoteProtocol,
    /// The job started but payment did not.
    PartialFailure,
    NotFound,
    Transport,
}

/// Error type for tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("{0}")]
    NotConfigured(String),

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error("HTTP error {operation}: {status} - {body}")]
    RemoteHttp {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{0}")]
    RemoteProtocol(String),

    #[error("Unexpected error {operation}: {reason}")]
    Transport { operation: String, reason: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{}", start_job_message(.agent, .status, .detail))]
    StartJobFailed {
        agent: String,
        status: Option<u16>,
        detail: String,
    },

    #[error(
        "Missing required data from agent's /start_job response: {}. Response: {response}",
        .missing.join(", ")
    )]
    IncompleteStartJobResponse {
        missing: Vec<String>,
        response: String,
    },

    #[error("Job {job_id} was started on agent {agent}, but failed to initiate payment: {reason}")]
    PaymentFailed {
        job_id: String,
        agent: String,
        reason: String,
    },
}

fn start_job_message(agent: &str, status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("Error from agent {agent}: {detail} (Status code: {code})"),
        None => format!("Unexpected error during /start_job call for {agent}: {detail}"),
    }
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameters(_) => ErrorKind::ParameterInvalid,
            Self::NotConfigured(_) => ErrorKind::ConfigurationMissing,
            Self::Safety(_) => ErrorKind::SafetyRejected,
            Self::RemoteHttp { .. } | Self::StartJobFailed { .. } => ErrorKind::RemoteHttp,
            Self::RemoteProtocol(_) | Self::IncompleteStartJobResponse { .. } => {
                ErrorKind::RemoteProtocol
            }
            Self::Transport { .. } => ErrorKind::Transport,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PaymentFailed { .. } => ErrorKind::PartialFailure,
        }
    }
}

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The result data.
    pub result: serde_json::Value,
    /// Time taken.
    pub duration: Duration,
}

impl ToolOutput {
    /// Create a successful output with a JSON result.
    pub fn success(result: serde_json::Value, duration: Duration) -> Self {
        Self { result, duration }
    }

    /// Create a text output.
    pub fn text(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            result: serde_json::Value::String(text.into()),
            duration,
        }
    }

    /// Render the result as MCP text content.
    ///
    /// Strings are passed through; structured results are pretty-printed.
    pub fn to_content_text(&self) -> String {
        match &self.result {
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }
}

/// Definition of a tool's parameters using JSON Schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub parameters: serde_json::Value,
}

/// A callable marketplace operation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name.
    fn name(&self) -> &str;

    /// Get a description of what the tool does.
    fn description(&self) -> &str;

    /// Get the JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ExecutionContext,
    ) -> Result<ToolOutput, ToolError>;

    /// Get the tool schema as advertised by `tools/list`.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Extract a required string parameter from a JSON object.
///
/// Returns `ToolError::InvalidParameters` if the key is missing or not a string.
pub fn require_str<'a>(params: &'a serde_json::Value, name: &str) -> Result<&'a str, ToolError> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters(format!("missing '{}' parameter", name)))
}

/// Extract a required parameter of any type from a JSON object.
///
/// Returns `ToolError::InvalidParameters` if the key is missing.
pub fn require_param<'a>(
    params: &'a serde_json::Value,
    name: &str,
) -> Result<&'a serde_json::Value, ToolError> {
    params
        .get(name)
        .ok_or_else(|| ToolError::InvalidParameters(format!("missing '{}' parameter", name)))
}

/// Extract an optional string parameter. `null` counts as absent.
pub fn optional_str<'a>(
    params: &'a serde_json::Value,
    name: &str,
) -> Result<Option<&'a str>, ToolError> {
    match params.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ToolError::InvalidParameters(format!(
            "'{}' must be a string",
            name
        ))),
    }
}

/// Extract an optional integer parameter. `null` counts as absent.
pub fn optional_i64(params: &serde_json::Value, name: &str) -> Result<Option<i64>, ToolError> {
    match params.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| {
            ToolError::InvalidParameters(format!("'{}' must be an integer", name))
        }),
    }
}

/// Extract an optional boolean parameter. `null` counts as absent.
pub fn optional_bool(params: &serde_json::Value, name: &str) -> Result<Option<bool>, ToolError> {
    match params.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v.as_bool().map(Some).ok_or_else(|| {
            ToolError::InvalidParameters(format!("'{}' must be a boolean", name))
        }),
    }
}

/// Lenient runtime validation of a tool's `parameters_schema()`.
///
/// Catches structural mistakes (missing `"type": "object"`, orphan
/// `"required"` keys, arrays without `"items"`) without rejecting
/// intentional freeform properties.
///
/// Returns a list of validation errors. An empty list means the schema is valid.
///
/// # Rules enforced
///
/// 1. Top-level must have `"type": "object"`
/// 2. Top-level must have `"properties"` as an object
/// 3. Every key in `"required"` must exist in `"properties"`
/// 4. Nested objects follow the same rules recursively
/// 5. Array properties should have `"items"` defined
///
/// Properties without a `"type"` field are allowed (freeform/any-type).
pub fn validate_tool_schema(schema: &serde_json::Value, path: &str) -> Vec<String> {
    let mut errors = Vec::new();

    match schema.get("type").and_then(|t| t.as_str()) {
        Some("object") => {}
        Some(other) => {
            errors.push(format!("{path}: expected type \"object\", got \"{other}\""));
            return errors;
        }
        None => {
            errors.push(format!("{path}: missing \"type\": \"object\""));
            return errors;
        }
    }

    let properties = match schema.get("properties").and_then(|p| p.as_object()) {
        Some(p) => p,
        None => {
            errors.push(format!("{path}: missing or non-object \"properties\""));
            return errors;
        }
    };

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for req in required {
            if let Some(key) = req.as_str()
                && !properties.contains_key(key)
            {
                errors.push(format!(
                    "{path}: required key \"{key}\" not found in properties"
                ));
            }
        }
    }

    for (key, prop) in properties {
        let prop_path = format!("{path}.{key}");
        if let Some(prop_type) = prop.get("type").and_then(|t| t.as_str()) {
            match prop_type {
                "object" => {
                    // Freeform objects (no "properties") are allowed, e.g. input_data.
                    if prop.get("properties").is_some() {
                        errors.extend(validate_tool_schema(prop, &prop_path));
                    }
                }
                "array" => {
                    if let Some(items) = prop.get("items") {
                        if items.get("type").and_then(|t| t.as_str()) == Some("object") {
                            errors
                                .extend(validate_tool_schema(items, &format!("{prop_path}.items")));
                        }
                    } else {
                        errors.push(format!("{prop_path}: array property missing \"items\""));
                    }
                }
                _ => {}
            }
        }
    }

    errors
}
