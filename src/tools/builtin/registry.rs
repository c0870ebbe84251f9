//! Registry queries and test-agent registration.
//!
//! Every tool here is gated on the Preprod network, and the two mutations
//! only touch agents whose name or identifier carries the test prefix.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::masumi::models::{
    AgentSummary, AgentsData, CapabilityBody, EntriesData, PRICING_CURRENCY, PricingBody,
    RegisterRequest, RegistryEntry, UnregisterRequest,
};
use crate::masumi::{excerpt, send};
use crate::safety::{Network, validate_test_identifier};
use crate::tools::builtin::{
    contract_address_param, expect_success, gated_network, invalid, to_result,
    with_service_headers,
};
use crate::tools::tool::{Tool, ToolError, ToolOutput, optional_str, require_param, require_str};

fn summarize(entries: &[Value], with_price: bool) -> Option<Vec<AgentSummary>> {
    (!entries.is_empty()).then(|| {
        entries
            .iter()
            .map(|e| AgentSummary::from_entry(&RegistryEntry::from_value(e), with_price))
            .collect()
    })
}

fn test_identifier(identifier: &str, what: &str) -> Result<(), ToolError> {
    validate_test_identifier(identifier).map_err(|e| {
        tracing::error!("{} validation failed: {}", what, e);
        ToolError::from(e)
    })
}

// ---------------------------------------------------------------------------
// query_registry
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct RegistryListing {
    status: &'static str,
    count: usize,
    network: Network,
    registry_entries: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_summary: Option<Vec<AgentSummary>>,
}

/// Pages through registry entries.
pub struct QueryRegistryTool;

#[async_trait]
impl Tool for QueryRegistryTool {
    fn name(&self) -> &str {
        "query_registry"
    }

    fn description(&self) -> &str {
        "Queries registry entries from the Masumi Registry Service, with agent details, \
         pricing and a per-agent summary. Only the Preprod network is allowed."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "network": {
                    "type": "string",
                    "enum": ["Preprod", "Mainnet"],
                    "description": "Cardano network. Only Preprod is allowed."
                },
                "cursor_id": {
                    "type": "string",
                    "description": "Pagination cursor from a previous page"
                },
                "smart_contract_address": {
                    "type": "string",
                    "description": "Optional smart contract address filter (max 250 characters)"
                }
            },
            "required": ["network"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let network = gated_network(&params)?;
        let smart_contract_address = contract_address_param(&params)?;
        let cursor_id = optional_str(&params, "cursor_id")?.filter(|c| !c.is_empty());
        let token = ctx.registry_token()?;
        let operation = "querying registry";

        let mut query = vec![("network", network.to_string())];
        if let Some(cursor) = cursor_id {
            query.push(("cursorId", cursor.to_string()));
        }
        if let Some(address) = smart_contract_address {
            query.push(("smartContractAddress", address.to_string()));
        }

        tracing::info!(%network, "Querying registry");
        let request = with_service_headers(ctx.http.get(ctx.endpoints.registry_entry.clone()), token)
            .query(&query);
        let response = send(request, operation).await?;
        let data: EntriesData = expect_success(response, operation, "Registry")?;
        tracing::info!("Successfully queried {} registry entries", data.entries.len());

        let listing = RegistryListing {
            status: "success",
            count: data.entries.len(),
            network,
            agent_summary: summarize(&data.entries, true),
            registry_entries: data.entries,
            cursor_id: cursor_id.map(str::to_string),
        };
        Ok(ToolOutput::success(to_result(&listing)?, start.elapsed()))
    }
}

// ---------------------------------------------------------------------------
// register_agent
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AgentDetails {
    name: String,
    api_base_url: String,
    capability: String,
    base_price: String,
    tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Registration {
    status: &'static str,
    message: String,
    network: Network,
    agent_details: AgentDetails,
    registration_data: Value,
}

fn optional_trimmed<'a>(params: &'a Value, key: &str) -> Result<Option<&'a str>, ToolError> {
    Ok(optional_str(params, key)?
        .map(str::trim)
        .filter(|s| !s.is_empty()))
}

fn tags_param(params: &Value) -> Result<Vec<String>, ToolError> {
    match params.get("tags") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|t| {
                t.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("'tags' must be a list of strings".to_string()))
            })
            .collect(),
        Some(_) => Err(invalid("'tags' must be a list of strings".to_string())),
    }
}

/// Registers a test agent in the registry.
pub struct RegisterAgentTool;

#[async_trait]
impl Tool for RegisterAgentTool {
    fn name(&self) -> &str {
        "register_agent"
    }

    fn description(&self) -> &str {
        "Registers a new agent in the Masumi Registry Service. Only the Preprod network is \
         allowed and the agent name must start with 'masumi-test-'."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "network": {
                    "type": "string",
                    "enum": ["Preprod", "Mainnet"],
                    "description": "Cardano network. Only Preprod is allowed."
                },
                "name": {
                    "type": "string",
                    "description": "Agent name; must start with 'masumi-test-'"
                },
                "api_base_url": {
                    "type": "string",
                    "description": "Base URL of the agent's API (http:// or https://)"
                },
                "selling_wallet_vkey": {
                    "type": "string",
                    "description": "Verification key of the selling wallet"
                },
                "capability_name": {
                    "type": "string",
                    "description": "Name of the agent's capability"
                },
                "capability_version": {
                    "type": "string",
                    "description": "Version of the agent's capability"
                },
                "base_price": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Base price in lovelace"
                },
                "tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional tags for categorization"
                },
                "description": {
                    "type": "string",
                    "description": "Optional description of the agent"
                },
                "author": {
                    "type": "string",
                    "description": "Optional author information"
                },
                "legal_info": {
                    "type": "string",
                    "description": "Optional legal information"
                }
            },
            "required": [
                "network",
                "name",
                "api_base_url",
                "selling_wallet_vkey",
                "capability_name",
                "capability_version",
                "base_price"
            ]
        })
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let network = gated_network(&params)?;

        let name = require_str(&params, "name")?.trim();
        if name.is_empty() {
            return Err(invalid("Agent name cannot be empty".to_string()));
        }
        test_identifier(name, "Agent name")?;

        let api_base_url = require_str(&params, "api_base_url")?.trim();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(invalid(
                "Invalid API base URL - must start with http:// or https://".to_string(),
            ));
        }

        let selling_wallet_vkey = require_str(&params, "selling_wallet_vkey")?.trim();
        if selling_wallet_vkey.is_empty() {
            return Err(invalid(
                "Selling wallet verification key cannot be empty".to_string(),
            ));
        }

        let base_price = require_param(&params, "base_price")?
            .as_i64()
            .ok_or_else(|| invalid("'base_price' must be an integer".to_string()))?;
        if base_price < 0 {
            return Err(invalid(format!(
                "Base price must be non-negative, got: {base_price}"
            )));
        }

        let capability_name = require_str(&params, "capability_name")?.trim();
        let capability_version = require_str(&params, "capability_version")?.trim();
        let tags = tags_param(&params)?;
        let description = optional_trimmed(&params, "description")?;
        let author = optional_trimmed(&params, "author")?;
        let legal_info = optional_trimmed(&params, "legal_info")?;

        let token = ctx.registry_token()?;
        let operation = "registering agent";

        let body = RegisterRequest {
            network,
            name,
            api_base_url,
            selling_wallet_vkey,
            tags: &tags,
            capability: CapabilityBody {
                name: capability_name,
                version: capability_version,
            },
            pricing: PricingBody {
                base_price,
                currency: PRICING_CURRENCY,
            },
            description,
            author,
            legal_info,
        };

        tracing::info!(name, %network, "Registering agent");
        let request = with_service_headers(ctx.http.post(ctx.endpoints.registry_entry.clone()), token)
            .json(&body);
        let response = send(request, operation).await?;
        let data: Value = expect_success(response, operation, "Registry")?;
        tracing::info!(name, "Successfully registered agent");

        let registration = Registration {
            status: "success",
            message: format!("Agent '{name}' registered successfully"),
            network,
            agent_details: AgentDetails {
                name: name.to_string(),
                api_base_url: api_base_url.to_string(),
                capability: format!("{capability_name} v{capability_version}"),
                base_price: format!("{base_price} lovelace"),
                tags,
            },
            registration_data: if data.is_null() {
                serde_json::json!({})
            } else {
                data
            },
        };
        Ok(ToolOutput::success(to_result(&registration)?, start.elapsed()))
    }
}

// ---------------------------------------------------------------------------
// unregister_agent
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Unregistration {
    status: &'static str,
    message: String,
    network: Network,
    agent_identifier: String,
    unregistration_data: Value,
}

/// Removes a test agent from the registry.
pub struct UnregisterAgentTool;

#[async_trait]
impl Tool for UnregisterAgentTool {
    fn name(&self) -> &str {
        "unregister_agent"
    }

    fn description(&self) -> &str {
        "Unregisters an agent from the Masumi Registry Service. Only the Preprod network is \
         allowed and the identifier must start with 'masumi-test-'."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "agent_identifier": {
                    "type": "string",
                    "description": "Identifier of the agent to unregister; must start with 'masumi-test-'"
                },
                "network": {
                    "type": "string",
                    "enum": ["Preprod", "Mainnet"],
                    "description": "Cardano network. Only Preprod is allowed."
                },
                "smart_contract_address": {
                    "type": "string",
                    "description": "Optional smart contract address"
                }
            },
            "required": ["agent_identifier", "network"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let network = gated_network(&params)?;

        let agent_identifier = require_str(&params, "agent_identifier")?.trim();
        if agent_identifier.is_empty() {
            return Err(invalid("Agent identifier cannot be empty".to_string()));
        }
        test_identifier(agent_identifier, "Agent identifier")?;
        let smart_contract_address = optional_trimmed(&params, "smart_contract_address")?;

        let token = ctx.registry_token()?;
        let operation = "unregistering agent";

        tracing::info!(agent_identifier, %network, "Unregistering agent");
        let request =
            with_service_headers(ctx.http.delete(ctx.endpoints.registry_entry.clone()), token)
                .json(&UnregisterRequest {
                    agent_identifier,
                    network,
                    smart_contract_address,
                });
        let response = send(request, operation).await?;
        if response.status == StatusCode::NOT_FOUND {
            let message = format!("Agent '{agent_identifier}' not found in registry");
            tracing::warn!("{}", message);
            return Err(ToolError::NotFound(message));
        }
        let data: Value = expect_success(response, operation, "Registry")?;
        tracing::info!(agent_identifier, "Successfully unregistered agent");

        let result = Unregistration {
            status: "success",
            message: format!("Agent '{agent_identifier}' unregistered successfully"),
            network,
            agent_identifier: agent_identifier.to_string(),
            unregistration_data: if data.is_null() {
                serde_json::json!({})
            } else {
                data
            },
        };
        Ok(ToolOutput::success(to_result(&result)?, start.elapsed()))
    }
}

// ---------------------------------------------------------------------------
// get_agents_by_wallet
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct WalletListing {
    status: &'static str,
    count: usize,
    network: Network,
    wallet_vkey: String,
    agents: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_summary: Option<Vec<AgentSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// Finds the agents registered to a selling wallet.
pub struct GetAgentsByWalletTool;

#[async_trait]
impl Tool for GetAgentsByWalletTool {
    fn name(&self) -> &str {
        "get_agents_by_wallet"
    }

    fn description(&self) -> &str {
        "Lists the agents associated with a wallet verification key in the Masumi Registry \
         Service. Only the Preprod network is allowed."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "network": {
                    "type": "string",
                    "enum": ["Preprod", "Mainnet"],
                    "description": "Cardano network. Only Preprod is allowed."
                },
                "wallet_vkey": {
                    "type": "string",
                    "description": "Wallet verification key to search for"
                }
            },
            "required": ["network", "wallet_vkey"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let network = gated_network(&params)?;
        let wallet_vkey = require_str(&params, "wallet_vkey")?.trim();
        if wallet_vkey.is_empty() {
            return Err(invalid("Wallet verification key cannot be empty".to_string()));
        }
        let token = ctx.registry_token()?;
        let operation = "querying agents by wallet";

        tracing::info!(
            %network,
            wallet = %excerpt(wallet_vkey, 20),
            "Querying agents by wallet"
        );
        let request =
            with_service_headers(ctx.http.get(ctx.endpoints.registry_wallet.clone()), token)
                .query(&[("network", network.as_str()), ("walletVkey", wallet_vkey)]);
        let response = send(request, operation).await?;

        if response.status == StatusCode::NOT_FOUND {
            tracing::info!("No agents found for wallet");
            let listing = WalletListing {
                status: "success",
                count: 0,
                network,
                wallet_vkey: wallet_vkey.to_string(),
                agents: Vec::new(),
                agent_summary: None,
                message: Some("No agents found for this wallet"),
            };
            return Ok(ToolOutput::success(to_result(&listing)?, start.elapsed()));
        }

        let data: AgentsData = expect_success(response, operation, "Registry")?;
        tracing::info!("Successfully found {} agent(s) for wallet", data.agents.len());

        let listing = WalletListing {
            status: "success",
            count: data.agents.len(),
            network,
            wallet_vkey: wallet_vkey.to_string(),
            agent_summary: summarize(&data.agents, false),
            agents: data.agents,
            message: None,
        };
        Ok(ToolOutput::success(to_result(&listing)?, start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::SafetyError;
    use crate::testing::test_context;

    fn registration(name: &str) -> Value {
        json!({
            "network": "Preprod",
            "name": name,
            "api_base_url": "https://agent.test",
            "selling_wallet_vkey": "vkey_test",
            "capability_name": "writing",
            "capability_version": "1.0.0",
            "base_price": 1000
        })
    }

    #[tokio::test]
    async fn register_checks_run_in_order() {
        let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");

        let mut params = registration("   ");
        params["network"] = json!("Mainnet");
        let err = RegisterAgentTool.execute(params, &ctx).await.unwrap_err();
        assert!(matches!(err, ToolError::Safety(SafetyError::UnsafeNetwork)));

        let err = RegisterAgentTool
            .execute(registration("   "), &ctx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Agent name cannot be empty"));

        let mut params = registration("masumi-test-agent");
        params["api_base_url"] = json!("ftp://agent.test");
        let err = RegisterAgentTool.execute(params, &ctx).await.unwrap_err();
        assert!(err.to_string().contains("must start with http:// or https://"));

        let mut params = registration("masumi-test-agent");
        params["selling_wallet_vkey"] = json!("");
        let err = RegisterAgentTool.execute(params, &ctx).await.unwrap_err();
        assert!(err.to_string().contains("Selling wallet verification key"));

        let mut params = registration("masumi-test-agent");
        params["base_price"] = json!(-1);
        let err = RegisterAgentTool.execute(params, &ctx).await.unwrap_err();
        assert!(err.to_string().contains("got: -1"));
    }

    #[tokio::test]
    async fn unregister_requires_test_identifier() {
        let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");
        let err = UnregisterAgentTool
            .execute(
                json!({"agent_identifier": "prod-agent", "network": "Preprod"}),
                &ctx,
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only test data allowed. Identifier must start with 'masumi-test-', got: prod-agent"
        );
    }

    #[test]
    fn tags_must_be_strings() {
        assert_eq!(tags_param(&json!({})).unwrap(), Vec::<String>::new());
        assert_eq!(
            tags_param(&json!({"tags": ["a", "b"]})).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(tags_param(&json!({"tags": [1]})).is_err());
        assert!(tags_param(&json!({"tags": "a"})).is_err());
    }
}
