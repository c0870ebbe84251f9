//! Request execution and failure mapping shared by every remote call.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::tools::ToolError;

/// Longest body excerpt carried in an HTTP error.
pub const ERROR_EXCERPT_CHARS: usize = 200;

/// Status and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Send a request and read the whole body.
///
/// Connection failures, timeouts and body read errors become
/// `ToolError::Transport`. HTTP error statuses are returned as-is for the
/// caller to interpret.
pub async fn send(request: RequestBuilder, operation: &str) -> Result<RemoteResponse, ToolError> {
    let response = request.send().await.map_err(|e| {
        tracing::error!(operation, "Request failed: {}", e);
        transport(operation, &e)
    })?;
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        tracing::error!(operation, %status, "Failed to read response body: {}", e);
        transport(operation, &e)
    })?;
    tracing::debug!(operation, %status, bytes = body.len(), "Remote call completed");
    Ok(RemoteResponse { status, body })
}

fn transport(operation: &str, err: &reqwest::Error) -> ToolError {
    let reason = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    };
    ToolError::Transport {
        operation: operation.to_string(),
        reason,
    }
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a 4xx/5xx into `ToolError::RemoteHttp` with a body excerpt.
    pub fn error_for_status(self, operation: &str) -> Result<Self, ToolError> {
        if self.is_success() {
            return Ok(self);
        }
        let err = ToolError::RemoteHttp {
            operation: operation.to_string(),
            status: self.status.as_u16(),
            body: excerpt(&self.body, ERROR_EXCERPT_CHARS),
        };
        tracing::error!(operation, status = self.status.as_u16(), "{}", err);
        Err(err)
    }

    /// Decode the body, mapping invalid JSON to `ToolError::RemoteProtocol`.
    pub fn json<T: DeserializeOwned>(&self, operation: &str) -> Result<T, ToolError> {
        serde_json::from_str(&self.body).map_err(|e| {
            let err = ToolError::RemoteProtocol(format!(
                "Invalid JSON response during {operation}: {e}"
            ));
            tracing::error!(operation, "{}", err);
            err
        })
    }
}

/// First `max_chars` characters of `text`.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Human-readable form of an agent's `detail` error field.
///
/// Validation errors arrive as a list of `{loc, msg}` items and are joined
/// as `field: message; ...`. Returns `None` when the body is not JSON or has
/// no `detail`.
pub fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| {
                    let loc = item
                        .get("loc")
                        .and_then(Value::as_array)
                        .and_then(|loc| loc.get(1).or_else(|| loc.last()))
                        .map(scalar_text)
                        .unwrap_or_else(|| "Unknown location".to_string());
                    let msg = item
                        .get("msg")
                        .map(scalar_text)
                        .unwrap_or_else(|| "Unknown error".to_string());
                    format!("{loc}: {msg}")
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        other => Some(other.to_string()),
    }
}

/// Text of a JSON scalar without quotes around strings.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
