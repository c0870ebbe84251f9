//! Agent discovery: registry listing and per-agent input schemas.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::masumi::models::{AgentDescriptor, EntriesData, RegistryEntry};
use crate::masumi::send;
use crate::safety::Network;
use crate::tools::builtin::{agent_base_url, expect_success, to_result, with_service_headers};
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str};

/// Page size requested by `list_agents`.
const LIST_AGENTS_LIMIT: u32 = 50;

#[derive(Debug, Serialize)]
struct ListAgentsBody {
    limit: u32,
    network: Network,
}

#[derive(Debug, Serialize)]
struct AgentListing {
    status: &'static str,
    count: usize,
    network: Network,
    agents: Vec<Value>,
    agent_summary: Vec<AgentDescriptor>,
}

/// Lists agents registered on the configured network.
pub struct ListAgentsTool;

#[async_trait]
impl Tool for ListAgentsTool {
    fn name(&self) -> &str {
        "list_agents"
    }

    fn description(&self) -> &str {
        "Lists available agents on the configured Masumi network from the registry. \
         Each entry includes 'agentIdentifier' and 'apiBaseUrl', which the other agent tools need."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let token = ctx.registry_token()?;
        let operation = "fetching agents";

        tracing::info!(
            network = %ctx.network,
            limit = LIST_AGENTS_LIMIT,
            "Fetching agents from registry"
        );

        let request = with_service_headers(ctx.http.post(ctx.endpoints.registry_entry.clone()), token)
            .json(&ListAgentsBody {
                limit: LIST_AGENTS_LIMIT,
                network: ctx.network,
            });
        let response = send(request, operation).await?;
        let data: EntriesData = expect_success(response, operation, "Registry")?;

        let agent_summary = data
            .entries
            .iter()
            .map(|entry| AgentDescriptor::from(&RegistryEntry::from_value(entry)))
            .collect();
        tracing::info!("Successfully fetched {} agent(s)", data.entries.len());

        let listing = AgentListing {
            status: "success",
            count: data.entries.len(),
            network: ctx.network,
            agents: data.entries,
            agent_summary,
        };
        Ok(ToolOutput::success(to_result(&listing)?, start.elapsed()))
    }
}

/// Fetches the input schema an agent expects in `hire_agent`'s `input_data`.
pub struct GetAgentInputSchemaTool;

#[async_trait]
impl Tool for GetAgentInputSchemaTool {
    fn name(&self) -> &str {
        "get_agent_input_schema"
    }

    fn description(&self) -> &str {
        "Fetches the required input schema for a specific agent's job execution. \
         Use this before hire_agent to learn what input_data the agent expects."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "agent_identifier": {
                    "type": "string",
                    "description": "The unique identifier of the agent"
                },
                "api_base_url": {
                    "type": "string",
                    "description": "The base URL for the agent's API (from list_agents)"
                }
            },
            "required": ["agent_identifier", "api_base_url"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let agent = require_str(&params, "agent_identifier")?;
        let base = agent_base_url(require_str(&params, "api_base_url")?, agent)?;
        let schema_url = format!("{base}input_schema");
        let operation = "fetching input schema";

        tracing::info!(agent, url = %schema_url, "Fetching agent input schema");
        let request = ctx
            .http
            .get(&schema_url)
            .header("accept", "application/json");
        let response = send(request, operation).await?;

        if response.status == StatusCode::NOT_FOUND {
            let message =
                format!("Input schema endpoint not found for agent {agent} at {schema_url}.");
            tracing::warn!("{}", message);
            return Err(ToolError::NotFound(message));
        }
        let response = response.error_for_status(operation)?;
        let schema: Value = serde_json::from_str(&response.body).map_err(|_| {
            let message =
                format!("Agent {agent} returned invalid JSON for input schema from {schema_url}.");
            tracing::error!("{}", message);
            ToolError::RemoteProtocol(message)
        })?;

        let pretty = serde_json::to_string_pretty(&schema).unwrap_or_else(|_| schema.to_string());
        tracing::info!(agent, "Successfully fetched input schema");
        Ok(ToolOutput::text(
            format!("--- Input Schema for Agent {agent} ---\n{pretty}"),
            start.elapsed(),
        ))
    }
}
