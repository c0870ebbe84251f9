//! Payment service queries: incoming payments and purchase history.

use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::context::ExecutionContext;
use crate::masumi::models::{EntriesData, PurchaseSummary};
use crate::masumi::send;
use crate::safety::Network;
use crate::tools::builtin::{
    contract_address_param, expect_success, gated_network, to_result, validate_limit,
    with_service_headers,
};
use crate::tools::tool::{Tool, ToolError, ToolOutput, optional_bool, optional_i64, optional_str};

const DEFAULT_LIMIT: i64 = 10;

fn page_parameters_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "network": {
                "type": "string",
                "enum": ["Preprod", "Mainnet"],
                "description": "Cardano network. Only Preprod is allowed."
            },
            "limit": {
                "type": "integer",
                "minimum": 1,
                "maximum": 100,
                "description": "Number of records to return (1-100, default 10)"
            },
            "cursor_id": {
                "type": "string",
                "description": "Pagination cursor from a previous page"
            },
            "smart_contract_address": {
                "type": "string",
                "description": "Optional smart contract address filter (max 250 characters)"
            },
            "include_history": {
                "type": "boolean",
                "description": "Include status history for each record (default false)"
            }
        },
        "required": ["network"]
    })
}

/// Validated paging arguments shared by both payment queries.
#[derive(Debug)]
struct PageQuery<'a> {
    network: Network,
    limit: u32,
    cursor_id: Option<&'a str>,
    smart_contract_address: Option<&'a str>,
    include_history: bool,
}

impl<'a> PageQuery<'a> {
    fn from_params(params: &'a Value) -> Result<Self, ToolError> {
        let network = gated_network(params)?;
        let limit = validate_limit(optional_i64(params, "limit")?.unwrap_or(DEFAULT_LIMIT))?;
        let smart_contract_address = contract_address_param(params)?;
        let cursor_id = optional_str(params, "cursor_id")?.filter(|c| !c.is_empty());
        let include_history = optional_bool(params, "include_history")?.unwrap_or(false);
        Ok(Self {
            network,
            limit,
            cursor_id,
            smart_contract_address,
            include_history,
        })
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("network", self.network.to_string()),
            ("limit", self.limit.to_string()),
            ("includeHistory", self.include_history.to_string()),
        ];
        if let Some(cursor) = self.cursor_id {
            pairs.push(("cursorId", cursor.to_string()));
        }
        if let Some(address) = self.smart_contract_address {
            pairs.push(("smartContractAddress", address.to_string()));
        }
        pairs
    }
}

async fn fetch_entries(
    ctx: &ExecutionContext,
    endpoint: &Url,
    query: &PageQuery<'_>,
    operation: &str,
    service: &str,
) -> Result<Vec<Value>, ToolError> {
    let token = ctx.payment_token()?;
    tracing::info!(
        network = %query.network,
        limit = query.limit,
        include_history = query.include_history,
        "{} {}",
        service,
        operation
    );
    let request =
        with_service_headers(ctx.http.get(endpoint.clone()), token).query(&query.query_pairs());
    let response = send(request, operation).await?;
    let data: EntriesData = expect_success(response, operation, service)?;
    Ok(data.entries)
}

#[derive(Debug, Serialize)]
struct PaymentListing {
    status: &'static str,
    count: usize,
    network: Network,
    payments: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor_id: Option<String>,
}

/// Lists payments received by the seller's agents.
pub struct QueryPaymentsTool;

#[async_trait]
impl Tool for QueryPaymentsTool {
    fn name(&self) -> &str {
        "query_payments"
    }

    fn description(&self) -> &str {
        "Queries payments from the Masumi Payment Service with optional pagination and \
         filtering. Only the Preprod network is allowed."
    }

    fn parameters_schema(&self) -> Value {
        page_parameters_schema()
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let query = PageQuery::from_params(&params)?;
        let entries = fetch_entries(
            ctx,
            &ctx.endpoints.payment,
            &query,
            "querying payments",
            "Payment",
        )
        .await?;
        tracing::info!("Successfully queried {} payment(s)", entries.len());

        let listing = PaymentListing {
            status: "success",
            count: entries.len(),
            network: query.network,
            payments: entries,
            cursor_id: query.cursor_id.map(str::to_string),
        };
        Ok(ToolOutput::success(to_result(&listing)?, start.elapsed()))
    }
}

#[derive(Debug, Serialize)]
struct PurchaseListing {
    status: &'static str,
    count: usize,
    network: Network,
    purchases: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purchase_summary: Option<Vec<PurchaseSummary>>,
}

/// Lists purchases made from this wallet.
pub struct GetPurchaseHistoryTool;

#[async_trait]
impl Tool for GetPurchaseHistoryTool {
    fn name(&self) -> &str {
        "get_purchase_history"
    }

    fn description(&self) -> &str {
        "Queries purchase history from the Masumi Payment Service, with a per-purchase \
         summary. Only the Preprod network is allowed."
    }

    fn parameters_schema(&self) -> Value {
        page_parameters_schema()
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let query = PageQuery::from_params(&params)?;
        let entries = fetch_entries(
            ctx,
            &ctx.endpoints.purchase,
            &query,
            "querying purchase history",
            "Purchase",
        )
        .await?;
        tracing::info!("Successfully queried {} purchase(s)", entries.len());

        let purchase_summary = (!entries.is_empty())
            .then(|| entries.iter().map(PurchaseSummary::from_value).collect());
        let listing = PurchaseListing {
            status: "success",
            count: entries.len(),
            network: query.network,
            purchases: entries,
            cursor_id: query.cursor_id.map(str::to_string),
            purchase_summary,
        };
        Ok(ToolOutput::success(to_result(&listing)?, start.elapsed()))
    }
}
