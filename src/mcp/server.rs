//! MCP stdio server.
//!
//! Reads newline-delimited JSON-RPC 2.0 from the reader and writes one
//! response line per request to the writer. Every request runs on its own
//! task, so a slow agent call never blocks `ping` or `tools/list`; a single
//! writer task owns the output stream and serializes the lines. Responses
//! may therefore arrive out of request order, matched up by `id`.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Semaphore, mpsc};

use crate::context::ExecutionContext;
use crate::error::ProtocolError;
use crate::mcp::prompts::{prompt_catalog, render_prompt};
use crate::mcp::protocol::{
    CallToolParams, CallToolResult, GetPromptParams, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, McpRequest, McpResponse, PARSE_ERROR, PROTOCOL_VERSION, TextContent,
};
use crate::tools::ToolRegistry;
use crate::tools::format::{DEFAULT_SEGMENT_CHARS, split_large_content};

/// Name reported in the `initialize` handshake.
pub const SERVER_NAME: &str = "masumi-mcp";

/// Requests handled concurrently before reading pauses.
pub const MAX_IN_FLIGHT: usize = 32;

pub struct McpServer {
    tools: ToolRegistry,
    ctx: Arc<ExecutionContext>,
}

impl McpServer {
    pub fn new(tools: ToolRegistry, ctx: Arc<ExecutionContext>) -> Self {
        Self { tools, ctx }
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn serve_stdio(self: Arc<Self>) -> Result<(), ProtocolError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until `reader` reaches EOF and every in-flight request has
    /// been answered.
    ///
    /// At most [`MAX_IN_FLIGHT`] requests run at once; reading pauses until
    /// one finishes. A frame that is not valid UTF-8 gets a parse error and
    /// the loop continues.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, mut writer: W) -> Result<(), ProtocolError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<String>(MAX_IN_FLIGHT);
        let in_flight = Arc::new(Semaphore::new(MAX_IN_FLIGHT));

        let writer_task = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        tracing::info!("MCP stdio server started");
        let mut reader = BufReader::new(reader);
        let mut frame = Vec::new();
        loop {
            frame.clear();
            if reader.read_until(b'\n', &mut frame).await? == 0 {
                break;
            }
            let line = match std::str::from_utf8(&frame) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    tracing::warn!("Frame is not valid UTF-8: {}", e);
                    let reply =
                        McpResponse::error(Value::Null, PARSE_ERROR, format!("Parse error: {e}"));
                    if tx.send(reply.to_line()).await.is_err() {
                        break;
                    }
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let Ok(permit) = Arc::clone(&in_flight).acquire_owned().await else {
                break;
            };
            let server = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                let _permit = permit;
                if let Some(response) = server.handle_message(&line).await
                    && tx.send(response).await.is_err()
                {
                    tracing::debug!("Writer closed before response could be sent");
                }
            });
        }

        // The writer drains once the last request task drops its sender.
        drop(tx);
        writer_task
            .await
            .map_err(|e| ProtocolError::Writer(e.to_string()))??;
        tracing::info!("MCP stdio server stopped");
        Ok(())
    }

    /// Handle one inbound line. Returns `None` for notifications.
    pub async fn handle_message(&self, line: &str) -> Option<String> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Unparsable message: {}", e);
                return Some(
                    McpResponse::error(Value::Null, PARSE_ERROR, format!("Parse error: {e}"))
                        .to_line(),
                );
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: McpRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(
                    McpResponse::error(id, INVALID_REQUEST, format!("Invalid request: {e}"))
                        .to_line(),
                );
            }
        };

        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        }
        if request.has_null_id() {
            tracing::warn!(method = %request.method, "Request with null id rejected");
            return Some(
                McpResponse::error(id, INVALID_REQUEST, "Invalid request: id must not be null")
                    .to_line(),
            );
        }

        Some(self.dispatch(request, id).await.to_line())
    }

    async fn dispatch(&self, request: McpRequest, id: Value) -> McpResponse {
        let params = request.params_or_empty();
        tracing::debug!(method = %request.method, "Request received");

        match request.method.as_str() {
            "initialize" => McpResponse::success(id, self.initialize_result()),
            "ping" => McpResponse::success(id, json!({})),
            "tools/list" => {
                let tools = self.tools.schemas().await;
                McpResponse::success(id, json!({ "tools": tools }))
            }
            "tools/call" => self.call_tool(id, params).await,
            "prompts/list" => McpResponse::success(id, json!({ "prompts": prompt_catalog() })),
            "prompts/get" => get_prompt(id, params),
            other => McpResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
        }
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "prompts": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, id: Value, params: Value) -> McpResponse {
        let call: CallToolParams = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return McpResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}")),
        };
        let arguments = match call.arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(args @ Value::Object(_)) => args,
            Some(_) => {
                return McpResponse::error(
                    id,
                    INVALID_PARAMS,
                    "Invalid params: arguments must be an object",
                );
            }
        };

        let Some(outcome) = self.tools.execute(&call.name, arguments, &self.ctx).await else {
            return McpResponse::error(id, INVALID_PARAMS, format!("Unknown tool: {}", call.name));
        };

        let result = match outcome {
            Ok(output) => CallToolResult {
                content: split_large_content(&output.to_content_text(), DEFAULT_SEGMENT_CHARS)
                    .into_iter()
                    .map(|chunk| TextContent::new(chunk.into_text()))
                    .collect(),
                is_error: false,
            },
            Err(err) => CallToolResult {
                content: vec![TextContent::new(format!("Error: {err}"))],
                is_error: true,
            },
        };
        match serde_json::to_value(result) {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::error(id, INVALID_PARAMS, format!("Unencodable result: {e}")),
        }
    }
}

fn get_prompt(id: Value, params: Value) -> McpResponse {
    let request: GetPromptParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(e) => return McpResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}")),
    };
    let arguments = request.arguments.unwrap_or_default();
    let Some(text) = render_prompt(&request.name, &arguments) else {
        return McpResponse::error(id, INVALID_PARAMS, format!("Unknown prompt: {}", request.name));
    };
    let description = prompt_catalog()
        .into_iter()
        .find(|p| p.name == request.name)
        .map(|p| p.description)
        .unwrap_or_default();

    McpResponse::success(
        id,
        json!({
            "description": description,
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": text }
            }]
        }),
    )
}
