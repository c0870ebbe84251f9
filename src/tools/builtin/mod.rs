//! Marketplace tools.

mod agents;
mod hire;
mod job;
mod payments;
mod registry;

pub use agents::{GetAgentInputSchemaTool, ListAgentsTool};
pub use hire::HireAgentTool;
pub use job::{CheckJobStatusTool, GetJobFullResultTool};
pub use payments::{GetPurchaseHistoryTool, QueryPaymentsTool};
pub use registry::{
    GetAgentsByWalletTool, QueryRegistryTool, RegisterAgentTool, UnregisterAgentTool,
};

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::masumi::RemoteResponse;
use crate::masumi::models::ApiEnvelope;
use crate::safety::{Network, validate_network};
use crate::tools::tool::{ToolError, optional_str, require_str};

/// Inclusive bounds for the `limit` query parameter.
pub(crate) const LIMIT_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

/// Longest accepted smart-contract address filter.
pub(crate) const MAX_CONTRACT_ADDRESS_CHARS: usize = 250;

/// Read and gate the `network` argument.
pub(crate) fn gated_network(params: &serde_json::Value) -> Result<Network, ToolError> {
    let network = require_str(params, "network")?;
    validate_network(network).map_err(|e| {
        tracing::error!("Testnet safety check failed: {}", e);
        ToolError::from(e)
    })
}

pub(crate) fn validate_limit(limit: i64) -> Result<u32, ToolError> {
    if LIMIT_RANGE.contains(&limit) {
        Ok(limit as u32)
    } else {
        Err(invalid(format!(
            "Limit must be between 1 and 100, got: {limit}"
        )))
    }
}

pub(crate) fn contract_address_param<'a>(
    params: &'a serde_json::Value,
) -> Result<Option<&'a str>, ToolError> {
    let address = optional_str(params, "smart_contract_address")?;
    if let Some(address) = address {
        let len = address.chars().count();
        if len > MAX_CONTRACT_ADDRESS_CHARS {
            return Err(invalid(format!(
                "Smart contract address too long (max {MAX_CONTRACT_ADDRESS_CHARS} chars), got: {len}"
            )));
        }
    }
    Ok(address.filter(|a| !a.is_empty()))
}

/// Agent base URL with a guaranteed trailing slash.
pub(crate) fn agent_base_url(api_base_url: &str, agent: &str) -> Result<String, ToolError> {
    if api_base_url.trim().is_empty() {
        return Err(invalid(format!(
            "api_base_url must be provided for agent {agent}."
        )));
    }
    Ok(normalize_base_url(api_base_url))
}

pub(crate) fn normalize_base_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

pub(crate) fn invalid(message: String) -> ToolError {
    tracing::error!("{}", message);
    ToolError::InvalidParameters(message)
}

/// Attach the headers every registry and payment call carries.
pub(crate) fn with_service_headers(request: RequestBuilder, token: &str) -> RequestBuilder {
    request
        .header("accept", "application/json")
        .header("token", token)
}

/// Unwrap a `{status, data}` envelope, requiring `status == "success"`.
pub(crate) fn expect_success<T>(
    response: RemoteResponse,
    operation: &str,
    service: &str,
) -> Result<T, ToolError>
where
    T: DeserializeOwned + Default,
{
    let response = response.error_for_status(operation)?;
    let envelope: ApiEnvelope<T> = response.json(operation)?;
    if !envelope.is_success() {
        let message = format!(
            "{service} API did not return success status: {}",
            envelope.status_text()
        );
        tracing::warn!("{}", message);
        return Err(ToolError::RemoteProtocol(message));
    }
    Ok(envelope.data.unwrap_or_default())
}

/// Serialize a typed envelope into the tool's JSON result.
pub(crate) fn to_result<T: serde::Serialize>(envelope: &T) -> Result<serde_json::Value, ToolError> {
    serde_json::to_value(envelope)
        .map_err(|e| ToolError::RemoteProtocol(format!("Could not encode response: {e}")))
}
