//! Wire models for the registry, payment service and agent job API.
//!
//! Inbound types are decoded leniently (missing fields default) except
//! where a field is required for correctness, as with [`JobHandle`].
//! Outbound request bodies are typed and serialize to the exact field
//! names the services expect.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::masumi::http::scalar_text;
use crate::safety::Network;

/// Placeholder used for absent summary fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Payment type sent with every purchase.
pub const PAYMENT_TYPE: &str = "Web3CardanoV1";

/// Currency recorded in registration pricing.
pub const PRICING_CURRENCY: &str = "ADA";

/// `{status, data}` wrapper used by the registry and payment services.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    /// Status as reported, for error messages.
    pub fn status_text(&self) -> &str {
        self.status.as_deref().unwrap_or("missing")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EntriesData {
    #[serde(default)]
    pub entries: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AgentsData {
    #[serde(default)]
    pub agents: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Registry entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Capability {
    pub name: Option<String>,
    pub version: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentPricing {
    #[serde(rename = "basePrice")]
    pub base_price: Option<Value>,
}

/// The subset of a registry entry used for summaries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryEntry {
    #[serde(rename = "agentIdentifier")]
    pub agent_identifier: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "apiBaseUrl")]
    pub api_base_url: Option<String>,
    #[serde(rename = "Capability")]
    pub capability: Option<Capability>,
    #[serde(rename = "AgentPricing")]
    pub pricing: Option<AgentPricing>,
    #[serde(rename = "Tags", alias = "tags")]
    pub tags: Option<Vec<Value>>,
    pub description: Option<String>,
    pub author: Option<Value>,
    pub status: Option<String>,
}

impl RegistryEntry {
    /// Project a raw entry; entries that do not fit the shape summarize as empty.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            tracing::debug!("Registry entry did not match expected shape: {}", e);
            Self::default()
        })
    }

    fn capability_name(&self) -> Option<&str> {
        self.capability.as_ref().and_then(|c| c.name.as_deref())
    }

    fn base_price(&self) -> Option<&Value> {
        self.pricing
            .as_ref()
            .and_then(|p| p.base_price.as_ref())
            .filter(|v| !v.is_null())
    }
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

/// Compact per-agent summary returned by `list_agents`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDescriptor {
    pub agent_identifier: String,
    pub name: String,
    pub api_base_url: String,
    pub capability_name: String,
    pub capability_version: String,
    pub base_price_lovelace: Value,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Value>,
    pub status: String,
}

impl From<&RegistryEntry> for AgentDescriptor {
    fn from(entry: &RegistryEntry) -> Self {
        Self {
            agent_identifier: or_na(entry.agent_identifier.as_deref()),
            name: or_na(entry.name.as_deref()),
            api_base_url: or_na(entry.api_base_url.as_deref()),
            capability_name: or_na(entry.capability_name()),
            capability_version: entry
                .capability
                .as_ref()
                .and_then(|c| c.version.as_ref())
                .filter(|v| !v.is_null())
                .map(scalar_text)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            base_price_lovelace: entry
                .base_price()
                .cloned()
                .unwrap_or_else(|| Value::String(NOT_AVAILABLE.to_string())),
            tags: entry
                .tags
                .iter()
                .flatten()
                .map(scalar_text)
                .collect(),
            description: entry.description.clone(),
            author: entry.author.clone().filter(|a| !a.is_null()),
            status: or_na(entry.status.as_deref()),
        }
    }
}

/// Summary item for `query_registry` and `get_agents_by_wallet`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    pub agent_identifier: String,
    pub name: String,
    pub api_base_url: String,
    pub capability: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Value>,
    pub status: String,
}

impl AgentSummary {
    pub fn from_entry(entry: &RegistryEntry, with_price: bool) -> Self {
        Self {
            agent_identifier: or_na(entry.agent_identifier.as_deref()),
            name: or_na(entry.name.as_deref()),
            api_base_url: or_na(entry.api_base_url.as_deref()),
            capability: or_na(entry.capability_name()),
            base_price: with_price.then(|| {
                entry
                    .base_price()
                    .cloned()
                    .unwrap_or_else(|| Value::String(NOT_AVAILABLE.to_string()))
            }),
            status: or_na(entry.status.as_deref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

/// Summary item for `get_purchase_history`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseSummary {
    pub id: Value,
    pub agent_identifier: Value,
    pub amount: Value,
    pub status: Value,
    pub created_at: Value,
}

impl PurchaseSummary {
    pub fn from_value(purchase: &Value) -> Self {
        let field = |key: &str| {
            purchase
                .get(key)
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| Value::String(NOT_AVAILABLE.to_string()))
        };
        Self {
            id: field("id"),
            agent_identifier: field("agentIdentifier"),
            amount: field("amount"),
            status: field("status"),
            created_at: field("createdAt"),
        }
    }
}

// ---------------------------------------------------------------------------
// Hire workflow
// ---------------------------------------------------------------------------

/// Body of `POST {agent}/start_job`.
#[derive(Debug, Serialize)]
pub struct StartJobRequest<'a> {
    pub identifier_from_purchaser: &'a str,
    pub input_data: &'a Value,
}

/// Raw `start_job` response. Every field is optional here so that all
/// missing fields can be reported together.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StartJobWire {
    pub job_id: Option<Value>,
    #[serde(rename = "blockchainIdentifier")]
    pub blockchain_identifier: Option<Value>,
    #[serde(rename = "sellerVKey")]
    pub seller_vkey: Option<Value>,
    #[serde(rename = "submitResultTime")]
    pub submit_result_time: Option<Value>,
    #[serde(rename = "unlockTime")]
    pub unlock_time: Option<Value>,
    #[serde(rename = "externalDisputeUnlockTime")]
    pub external_dispute_unlock_time: Option<Value>,
    pub input_hash: Option<Value>,
    #[serde(rename = "agentIdentifier")]
    pub agent_identifier: Option<Value>,
}

/// A started job and the payment correlation fields it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
    pub blockchain_identifier: String,
    pub seller_vkey: String,
    pub submit_result_time: String,
    pub unlock_time: String,
    pub external_dispute_unlock_time: String,
    pub input_hash: String,
    pub agent_identifier: String,
    pub identifier_from_purchaser: String,
}

impl JobHandle {
    /// Build a handle, or list the wire names of every missing field.
    pub fn from_wire(
        wire: StartJobWire,
        identifier_from_purchaser: &str,
    ) -> Result<Self, Vec<String>> {
        let mut missing = Vec::new();
        let mut take = |value: Option<Value>, wire_name: &str| -> String {
            match value {
                Some(v) if !v.is_null() => scalar_text(&v),
                _ => {
                    missing.push(wire_name.to_string());
                    String::new()
                }
            }
        };

        let handle = Self {
            job_id: take(wire.job_id, "job_id"),
            blockchain_identifier: take(wire.blockchain_identifier, "blockchainIdentifier"),
            seller_vkey: take(wire.seller_vkey, "sellerVKey"),
            submit_result_time: take(wire.submit_result_time, "submitResultTime"),
            unlock_time: take(wire.unlock_time, "unlockTime"),
            external_dispute_unlock_time: take(
                wire.external_dispute_unlock_time,
                "externalDisputeUnlockTime",
            ),
            input_hash: take(wire.input_hash, "input_hash"),
            agent_identifier: take(wire.agent_identifier, "agentIdentifier"),
            identifier_from_purchaser: identifier_from_purchaser.to_string(),
        };

        if missing.is_empty() {
            Ok(handle)
        } else {
            Err(missing)
        }
    }
}

/// Body of `POST {payment}/api/v1/purchase/`.
///
/// Time fields travel as decimal strings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest<'a> {
    pub identifier_from_purchaser: &'a str,
    pub blockchain_identifier: &'a str,
    pub network: Network,
    pub seller_vkey: &'a str,
    pub payment_type: &'static str,
    pub submit_result_time: &'a str,
    pub unlock_time: &'a str,
    pub external_dispute_unlock_time: &'a str,
    pub agent_identifier: &'a str,
    pub input_hash: &'a str,
}

impl<'a> PurchaseRequest<'a> {
    pub fn for_job(job: &'a JobHandle, network: Network) -> Self {
        Self {
            identifier_from_purchaser: &job.identifier_from_purchaser,
            blockchain_identifier: &job.blockchain_identifier,
            network,
            seller_vkey: &job.seller_vkey,
            payment_type: PAYMENT_TYPE,
            submit_result_time: &job.submit_result_time,
            unlock_time: &job.unlock_time,
            external_dispute_unlock_time: &job.external_dispute_unlock_time,
            agent_identifier: &job.agent_identifier,
            input_hash: &job.input_hash,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextAction {
    #[serde(rename = "requestedAction")]
    pub requested_action: Option<String>,
}

/// `data` of a successful purchase response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PurchaseData {
    pub id: Option<Value>,
    #[serde(rename = "NextAction")]
    pub next_action: Option<NextAction>,
}

impl PurchaseData {
    pub fn payment_id(&self) -> String {
        self.id
            .as_ref()
            .filter(|v| !v.is_null())
            .map(scalar_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn requested_action(&self) -> &str {
        self.next_action
            .as_ref()
            .and_then(|a| a.requested_action.as_deref())
            .unwrap_or("Unknown")
    }
}

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobStatusWire {
    pub status: Option<Value>,
    pub payment_status: Option<Value>,
    pub result: Option<Value>,
}

/// Point-in-time view of a job; fetched fresh on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusSnapshot {
    pub status: String,
    pub payment_status: String,
    pub result: Option<Value>,
}

impl From<JobStatusWire> for JobStatusSnapshot {
    fn from(wire: JobStatusWire) -> Self {
        let text = |v: Option<Value>, default: &str| {
            v.filter(|v| !v.is_null())
                .map(|v| scalar_text(&v))
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            status: text(wire.status, "Unknown"),
            payment_status: text(wire.payment_status, NOT_AVAILABLE),
            result: wire.result.filter(|v| !v.is_null()),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry mutations
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CapabilityBody<'a> {
    pub name: &'a str,
    pub version: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PricingBody {
    #[serde(rename = "basePrice")]
    pub base_price: i64,
    pub currency: &'static str,
}

/// Body of `POST registry-entry/`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub network: Network,
    pub name: &'a str,
    #[serde(rename = "apiBaseUrl")]
    pub api_base_url: &'a str,
    #[serde(rename = "sellingWalletVkey")]
    pub selling_wallet_vkey: &'a str,
    #[serde(rename = "Tags")]
    pub tags: &'a [String],
    #[serde(rename = "Capability")]
    pub capability: CapabilityBody<'a>,
    #[serde(rename = "AgentPricing")]
    pub pricing: PricingBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<&'a str>,
    #[serde(rename = "legalInfo", skip_serializing_if = "Option::is_none")]
    pub legal_info: Option<&'a str>,
}

/// Body of `DELETE registry-entry/`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnregisterRequest<'a> {
    pub agent_identifier: &'a str,
    pub network: Network,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_contract_address: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn complete_start_job() -> Value {
        json!({
            "job_id": "job-123",
            "blockchainIdentifier": "bc-1",
            "sellerVKey": "seller-vkey",
            "submitResultTime": 1717171717,
            "unlockTime": "1717181717",
            "externalDisputeUnlockTime": 1717191717,
            "input_hash": "hash-1",
            "agentIdentifier": "agent-1",
            "status": "awaiting_payment"
        })
    }

    #[test]
    fn job_handle_from_complete_response() {
        let wire: StartJobWire = serde_json::from_value(complete_start_job()).unwrap();
        let handle = JobHandle::from_wire(wire, "example_purchaser_042").unwrap();
        assert_eq!(handle.job_id, "job-123");
        assert_eq!(handle.submit_result_time, "1717171717");
        assert_eq!(handle.unlock_time, "1717181717");
        assert_eq!(handle.identifier_from_purchaser, "example_purchaser_042");
    }

    #[test]
    fn job_handle_lists_every_missing_field() {
        let mut body = complete_start_job();
        body.as_object_mut().unwrap().remove("input_hash");
        body["sellerVKey"] = Value::Null;
        let wire: StartJobWire = serde_json::from_value(body).unwrap();
        let missing = JobHandle::from_wire(wire, "p").unwrap_err();
        assert_eq!(missing, vec!["sellerVKey".to_string(), "input_hash".to_string()]);
    }

    #[test]
    fn purchase_request_uses_service_field_names() {
        let wire: StartJobWire = serde_json::from_value(complete_start_job()).unwrap();
        let handle = JobHandle::from_wire(wire, "example_purchaser_042").unwrap();
        let body = serde_json::to_value(PurchaseRequest::for_job(&handle, Network::Preprod)).unwrap();
        assert_eq!(
            body,
            json!({
                "identifierFromPurchaser": "example_purchaser_042",
                "blockchainIdentifier": "bc-1",
                "network": "Preprod",
                "sellerVkey": "seller-vkey",
                "paymentType": "Web3CardanoV1",
                "submitResultTime": "1717171717",
                "unlockTime": "1717181717",
                "externalDisputeUnlockTime": "1717191717",
                "agentIdentifier": "agent-1",
                "inputHash": "hash-1"
            })
        );
    }

    #[test]
    fn purchase_data_defaults() {
        let data = PurchaseData::default();
        assert_eq!(data.payment_id(), "N/A");
        assert_eq!(data.requested_action(), "Unknown");

        let data: PurchaseData = serde_json::from_value(json!({
            "id": "pay-1",
            "NextAction": {"requestedAction": "FundsLockingRequested"}
        }))
        .unwrap();
        assert_eq!(data.payment_id(), "pay-1");
        assert_eq!(data.requested_action(), "FundsLockingRequested");
    }

    #[test]
    fn agent_descriptor_from_registry_entry() {
        let entry = RegistryEntry::from_value(&json!({
            "agentIdentifier": "agent-1",
            "name": "Writer",
            "apiBaseUrl": "http://writer.test",
            "Capability": {"name": "writing", "version": "1.0.0"},
            "AgentPricing": {"basePrice": 5000000},
            "Tags": ["text", "stories"],
            "status": "Online"
        }));
        let descriptor = AgentDescriptor::from(&entry);
        assert_eq!(descriptor.agent_identifier, "agent-1");
        assert_eq!(descriptor.capability_name, "writing");
        assert_eq!(descriptor.capability_version, "1.0.0");
        assert_eq!(descriptor.base_price_lovelace, json!(5000000));
        assert_eq!(descriptor.tags, vec!["text", "stories"]);
        assert_eq!(descriptor.description, None);
    }

    #[test]
    fn summaries_default_to_not_available() {
        let entry = RegistryEntry::from_value(&json!({"name": "Bare"}));
        let summary = AgentSummary::from_entry(&entry, true);
        assert_eq!(summary.agent_identifier, "N/A");
        assert_eq!(summary.base_price, Some(json!("N/A")));
        assert_eq!(AgentSummary::from_entry(&entry, false).base_price, None);

        let purchase = PurchaseSummary::from_value(&json!({"id": "p1", "amount": 10}));
        assert_eq!(purchase.id, json!("p1"));
        assert_eq!(purchase.amount, json!(10));
        assert_eq!(purchase.created_at, json!("N/A"));
    }

    #[test]
    fn job_status_snapshot_defaults() {
        let wire: JobStatusWire = serde_json::from_value(json!({"result": null})).unwrap();
        let snapshot = JobStatusSnapshot::from(wire);
        assert_eq!(snapshot.status, "Unknown");
        assert_eq!(snapshot.payment_status, "N/A");
        assert_eq!(snapshot.result, None);
    }

    #[test]
    fn register_request_shape() {
        let tags = vec!["test".to_string()];
        let body = serde_json::to_value(RegisterRequest {
            network: Network::Preprod,
            name: "masumi-test-agent",
            api_base_url: "http://agent.test",
            selling_wallet_vkey: "vkey",
            tags: &tags,
            capability: CapabilityBody {
                name: "writing",
                version: "1.0",
            },
            pricing: PricingBody {
                base_price: 1000,
                currency: PRICING_CURRENCY,
            },
            description: None,
            author: Some("me"),
            legal_info: None,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "network": "Preprod",
                "name": "masumi-test-agent",
                "apiBaseUrl": "http://agent.test",
                "sellingWalletVkey": "vkey",
                "Tags": ["test"],
                "Capability": {"name": "writing", "version": "1.0"},
                "AgentPricing": {"basePrice": 1000, "currency": "ADA"},
                "author": "me"
            })
        );
    }
}
