//! Hiring an agent: start a job on the agent, then pay for it.
//!
//! The two calls are not atomic. A failure before the job exists is a
//! `StartJobFailed` (or `IncompleteStartJobResponse`) and no payment is
//! attempted. Once the job exists, every failure is a `PaymentFailed` that
//! names the job so the caller knows work was already started.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::masumi::http::ERROR_EXCERPT_CHARS;
use crate::masumi::models::{
    ApiEnvelope, JobHandle, PurchaseData, PurchaseRequest, StartJobRequest, StartJobWire,
};
use crate::masumi::{detail_message, excerpt, send};
use crate::tools::builtin::{agent_base_url, invalid, with_service_headers};
use crate::tools::redaction::redact_sensitive_json;
use crate::tools::tool::{Tool, ToolError, ToolOutput, optional_str, require_str};

/// Agent-side detail text for a payload that does not match its schema.
const SCHEMA_MISMATCH_DETAIL: &str = "Input_data or identifier_from_purchaser is missing";

/// Starts a job on an agent and initiates its payment.
pub struct HireAgentTool;

#[async_trait]
impl Tool for HireAgentTool {
    fn name(&self) -> &str {
        "hire_agent"
    }

    fn description(&self) -> &str {
        "Hires an agent on the Masumi network: starts a job with the given input_data and \
         initiates payment for it. This spends funds. Never call it with generated input; \
         always ask the user for the exact values and confirm before hiring. \
         Use get_agent_input_schema first to learn the required inputs."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "agent_identifier": {
                    "type": "string",
                    "description": "The unique identifier of the agent to hire"
                },
                "api_base_url": {
                    "type": "string",
                    "description": "The base URL for the agent's API (from list_agents)"
                },
                "input_data": {
                    "type": "object",
                    "description": "Inputs matching the agent's input schema, e.g. {\"text\": \"Write a story\"}"
                }
            },
            "required": ["agent_identifier", "api_base_url", "input_data"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let agent = require_str(&params, "agent_identifier")?;

        let input_data = match params.get("input_data") {
            Some(data) if data.as_object().is_some_and(|m| !m.is_empty()) => data,
            other => {
                tracing::error!(received = %loggable_input(other), "Rejected hire input_data");
                return Err(invalid(
                    "The 'input_data' parameter must be a non-empty dictionary containing \
                     the agent's required inputs. Please provide the required inputs based on \
                     the agent's schema (use get_agent_input_schema)."
                        .to_string(),
                ));
            }
        };
        let payment_token = ctx.payment_token()?;
        let base = agent_base_url(optional_str(&params, "api_base_url")?.unwrap_or(""), agent)?;

        tracing::info!(agent, url = %base, "Initiating hiring process");

        let purchaser_id = ctx.purchaser_ids.next_id();
        let job = start_job(ctx, agent, &base, &purchaser_id, input_data).await?;
        let message = initiate_payment(ctx, payment_token, &job).await?;

        Ok(ToolOutput::text(message, start.elapsed()))
    }
}

/// `POST {base}start_job` and decode the payment correlation fields.
async fn start_job(
    ctx: &ExecutionContext,
    agent: &str,
    base: &str,
    purchaser_id: &str,
    input_data: &Value,
) -> Result<JobHandle, ToolError> {
    let url = format!("{base}start_job");
    let body = StartJobRequest {
        identifier_from_purchaser: purchaser_id,
        input_data,
    };
    if let Ok(payload) = serde_json::to_value(&body) {
        tracing::debug!(payload = %redact_sensitive_json(&payload), "Payload for /start_job");
    }

    let failed = |status: Option<u16>, detail: String| ToolError::StartJobFailed {
        agent: agent.to_string(),
        status,
        detail,
    };

    tracing::info!(agent, %url, purchaser_id, "Calling start_job");
    let request = ctx
        .http
        .post(&url)
        .header("accept", "application/json")
        .json(&body);
    let response = send(request, "calling start_job")
        .await
        .map_err(|e| failed(None, failure_reason(e)))?;
    tracing::info!(status = response.status.as_u16(), "/start_job response received");

    if response.status == StatusCode::BAD_REQUEST {
        tracing::error!(
            body = %response.body,
            "Agent returned 400 Bad Request for /start_job"
        );
    }
    if !response.is_success() {
        let detail = match detail_message(&response.body) {
            Some(d) if d.contains(SCHEMA_MISMATCH_DETAIL) => {
                "Input data or identifier is invalid/missing. Please ensure input matches \
                 schema and try again."
                    .to_string()
            }
            Some(d) => d,
            None => response.body,
        };
        let err = failed(Some(response.status.as_u16()), detail);
        tracing::error!("{}", err);
        return Err(err);
    }

    let raw: Value = serde_json::from_str(&response.body)
        .map_err(|e| failed(None, format!("invalid JSON in /start_job response: {e}")))?;
    let wire: StartJobWire = serde_json::from_value(raw.clone())
        .map_err(|e| failed(None, format!("unexpected /start_job response shape: {e}")))?;

    let job = JobHandle::from_wire(wire, purchaser_id).map_err(|missing| {
        let err = ToolError::IncompleteStartJobResponse {
            missing,
            response: raw.to_string(),
        };
        tracing::error!("{}", err);
        err
    })?;

    tracing::info!(
        agent,
        job_id = %job.job_id,
        "Job started successfully, proceeding to payment"
    );
    Ok(job)
}

/// `POST {payment}/api/v1/purchase/` for a started job.
async fn initiate_payment(
    ctx: &ExecutionContext,
    token: &str,
    job: &JobHandle,
) -> Result<String, ToolError> {
    let partial = |reason: String| {
        let err = ToolError::PaymentFailed {
            job_id: job.job_id.clone(),
            agent: job.agent_identifier.clone(),
            reason,
        };
        tracing::error!("{}", err);
        err
    };

    let body = PurchaseRequest::for_job(job, ctx.network);
    if let Ok(payload) = serde_json::to_value(&body) {
        tracing::debug!(payload = %redact_sensitive_json(&payload), "Payload for /purchase");
    }

    tracing::info!(job_id = %job.job_id, url = %ctx.endpoints.purchase, "Calling payment service");
    let request =
        with_service_headers(ctx.http.post(ctx.endpoints.purchase.clone()), token).json(&body);
    let response = send(request, "calling payment service")
        .await
        .map_err(|e| partial(failure_reason(e)))?;
    tracing::info!(status = response.status.as_u16(), "/purchase response received");

    if !response.is_success() {
        return Err(partial(format!(
            "HTTP error calling payment service for job {}: {} - Response Body: {}",
            job.job_id,
            response.status.as_u16(),
            excerpt(&response.body, ERROR_EXCERPT_CHARS)
        )));
    }

    let envelope: ApiEnvelope<Value> = serde_json::from_str(&response.body)
        .map_err(|e| partial(format!("invalid JSON from payment service: {e}")))?;
    if !envelope.is_success() {
        return Err(partial(format!(
            "Payment service returned status '{}'. Details: {}",
            envelope.status_text(),
            response.body
        )));
    }

    let data: PurchaseData = envelope
        .data
        .and_then(|d| serde_json::from_value(d).ok())
        .unwrap_or_default();
    let message = format!(
        "Successfully hired agent {}. Job ID: {}. Payment initiated (ID: {}), Next Action: {}.",
        job.agent_identifier,
        job.job_id,
        data.payment_id(),
        data.requested_action()
    );
    tracing::info!("{}", message);
    Ok(message)
}

/// Redacted copy of a hire input for logging.
fn loggable_input(input: Option<&Value>) -> Value {
    input.map(redact_sensitive_json).unwrap_or(Value::Null)
}

fn failure_reason(err: ToolError) -> String {
    match err {
        ToolError::Transport { reason, .. } => reason,
        other => other.to_string(),
    }
}
