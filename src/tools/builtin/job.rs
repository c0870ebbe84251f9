//! Job status tracking against an agent's `/status` endpoint.
//!
//! Nothing is cached: every call fetches a fresh snapshot.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::masumi::models::{JobStatusSnapshot, JobStatusWire};
use crate::masumi::{detail_message, send};
use crate::tools::builtin::agent_base_url;
use crate::tools::format::{FullResultCall, RESULT_PREVIEW_CHARS, format_result, result_text};
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str};

fn job_parameters_schema() -> Value {
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
            },
            "job_id": {
                "type": "string",
                "description": "The job ID returned by hire_agent"
            }
        },
        "required": ["agent_identifier", "api_base_url", "job_id"]
    })
}

struct JobRef<'a> {
    agent: &'a str,
    base: String,
    job_id: &'a str,
}

impl<'a> JobRef<'a> {
    fn from_params(params: &'a Value) -> Result<Self, ToolError> {
        let agent = require_str(params, "agent_identifier")?;
        let base = agent_base_url(require_str(params, "api_base_url")?, agent)?;
        let job_id = require_str(params, "job_id")?;
        Ok(Self {
            agent,
            base,
            job_id,
        })
    }
}

async fn fetch_status(ctx: &ExecutionContext, job: &JobRef<'_>) -> Result<JobStatusSnapshot, ToolError> {
    let url = format!("{}status", job.base);
    let operation = format!("checking status for job {}", job.job_id);

    tracing::info!(agent = job.agent, job_id = job.job_id, %url, "Calling agent status endpoint");
    let request = ctx
        .http
        .get(&url)
        .header("accept", "application/json")
        .query(&[("job_id", job.job_id)]);
    let response = send(request, &operation).await?;

    if response.status == StatusCode::NOT_FOUND {
        let message = format!("Job {} not found on agent {}.", job.job_id, job.agent);
        tracing::warn!("{}", message);
        return Err(ToolError::NotFound(message));
    }
    if !response.is_success() {
        let detail = detail_message(&response.body).unwrap_or_else(|| {
            response
                .status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
        let err = ToolError::RemoteHttp {
            operation: "checking job status".to_string(),
            status: response.status.as_u16(),
            body: detail,
        };
        tracing::error!("{}", err);
        return Err(err);
    }

    let wire: JobStatusWire = response.json(&operation)?;
    Ok(JobStatusSnapshot::from(wire))
}

/// Reports a job's status with a bounded result preview.
pub struct CheckJobStatusTool;

#[async_trait]
impl Tool for CheckJobStatusTool {
    fn name(&self) -> &str {
        "check_job_status"
    }

    fn description(&self) -> &str {
        "Checks the status of a job previously started with hire_agent. Large results are \
         shown as a preview together with the get_job_full_result call that returns them whole."
    }

    fn parameters_schema(&self) -> Value {
        job_parameters_schema()
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let job = JobRef::from_params(&params)?;
        let snapshot = fetch_status(ctx, &job).await?;

        let header = format!(
            "--- Job Status Report for {} ---\nAgent: {}\nStatus: {}\nPayment Status: {}\n",
            job.job_id, job.agent, snapshot.status, snapshot.payment_status
        );
        let report = match &snapshot.result {
            None => format!("{header}\nResult: Not available"),
            Some(result) => {
                let text = result_text(result);
                let follow_up = FullResultCall {
                    agent_identifier: job.agent,
                    api_base_url: &job.base,
                    job_id: job.job_id,
                };
                let formatted = format_result(&text, RESULT_PREVIEW_CHARS, &follow_up);
                if formatted.truncated {
                    format!("{header}\n{}", formatted.text)
                } else {
                    format!("{header}\n{}:\n\n{}", text.label(), formatted.text)
                }
            }
        };

        tracing::info!(job_id = job.job_id, status = %snapshot.status, "Job status retrieved");
        Ok(ToolOutput::text(report, start.elapsed()))
    }
}

/// Returns a job's complete result without truncation.
pub struct GetJobFullResultTool;

#[async_trait]
impl Tool for GetJobFullResultTool {
    fn name(&self) -> &str {
        "get_job_full_result"
    }

    fn description(&self) -> &str {
        "Retrieves the complete result of a job without truncation. Use it after \
         check_job_status reports a truncated preview."
    }

    fn parameters_schema(&self) -> Value {
        job_parameters_schema()
    }

    async fn execute(&self, params: Value, ctx: &ExecutionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let job = JobRef::from_params(&params)?;
        let snapshot = fetch_status(ctx, &job).await?;

        let text = match &snapshot.result {
            None => "No result available for this job.".to_string(),
            Some(result) => result_text(result).text,
        };
        Ok(ToolOutput::text(text, start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::testing::test_context;

    async fn agent_with_status(body: Value) -> MockServer {
        let agent = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(query_param("job_id", "job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&agent)
            .await;
        agent
    }

    fn params(agent: &MockServer) -> Value {
        json!({"agent_identifier": "agent-1", "api_base_url": agent.uri(), "job_id": "job-1"})
    }

    #[tokio::test]
    async fn report_without_result() {
        let agent = agent_with_status(json!({"status": "running"})).await;
        let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");
        let output = CheckJobStatusTool.execute(params(&agent), &ctx).await.unwrap();
        assert_eq!(
            output.result.as_str().unwrap(),
            "--- Job Status Report for job-1 ---\nAgent: agent-1\nStatus: running\n\
             Payment Status: N/A\n\nResult: Not available"
        );
    }

    #[tokio::test]
    async fn full_result_without_result() {
        let agent = agent_with_status(json!({"status": "running", "result": null})).await;
        let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");
        let output = GetJobFullResultTool.execute(params(&agent), &ctx).await.unwrap();
        assert_eq!(output.result, json!("No result available for this job."));
    }

    #[tokio::test]
    async fn json_result_is_labelled() {
        let agent = agent_with_status(json!({
            "status": "completed",
            "payment_status": "result_submitted",
            "result": {"answer": 42}
        }))
        .await;
        let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");
        let output = CheckJobStatusTool.execute(params(&agent), &ctx).await.unwrap();
        let text = output.result.as_str().unwrap();
        assert!(text.contains("Payment Status: result_submitted\n"));
        assert!(text.ends_with("\nResult (JSON):\n\n{\n  \"answer\": 42\n}"));
    }
}
