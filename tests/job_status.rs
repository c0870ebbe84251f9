//! Job status reports and full-result retrieval against a stub agent.

use masumi_mcp::testing::test_context;
use masumi_mcp::tools::builtin::{CheckJobStatusTool, GetJobFullResultTool};
use masumi_mcp::tools::{ErrorKind, Tool};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn agent_with(job_id: &str, template: ResponseTemplate) -> MockServer {
    let agent = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .and(query_param("job_id", job_id))
        .respond_with(template)
        .mount(&agent)
        .await;
    agent
}

fn params(agent: &MockServer, job_id: &str) -> Value {
    json!({
        "agent_identifier": "agent-1",
        "api_base_url": agent.uri(),
        "job_id": job_id
    })
}

#[tokio::test]
async fn short_text_result_is_shown_whole() {
    let agent = agent_with(
        "job-1",
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "payment_status": "result_submitted",
            "result": "A short poem."
        })),
    )
    .await;
    let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");

    let output = CheckJobStatusTool
        .execute(params(&agent, "job-1"), &ctx)
        .await
        .unwrap();
    assert_eq!(
        output.result,
        json!(
            "--- Job Status Report for job-1 ---\nAgent: agent-1\nStatus: completed\n\
             Payment Status: result_submitted\n\nResult:\n\nA short poem."
        )
    );
}

#[tokio::test]
async fn long_raw_result_is_previewed_with_follow_up() {
    let raw = "x".repeat(3500);
    let agent = agent_with(
        "job-2",
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "result": {"raw": raw}
        })),
    )
    .await;
    let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");

    let output = CheckJobStatusTool
        .execute(params(&agent, "job-2"), &ctx)
        .await
        .unwrap();
    let text = output.result.as_str().unwrap();

    assert!(text.contains("Result Preview (truncated - full result is 3500 characters):\n\n"));
    assert!(text.contains(&format!("\n\n{}...\n\n", "x".repeat(3000))));
    assert!(!text.contains(&"x".repeat(3001)));
    assert!(text.ends_with(&format!(
        "get_job_full_result(agent_identifier='agent-1', api_base_url='{}/', job_id='job-2')",
        agent.uri()
    )));
}

#[tokio::test]
async fn full_result_is_never_truncated() {
    let raw = "y".repeat(5000);
    let agent = agent_with(
        "job-3",
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "result": {"raw": raw.clone()}
        })),
    )
    .await;
    let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");

    let output = GetJobFullResultTool
        .execute(params(&agent, "job-3"), &ctx)
        .await
        .unwrap();
    assert_eq!(output.result, json!(raw));
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let agent = agent_with("job-4", ResponseTemplate::new(404)).await;
    let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");

    let err = CheckJobStatusTool
        .execute(params(&agent, "job-4"), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Job job-4 not found on agent agent-1.");
}

#[tokio::test]
async fn server_error_carries_detail() {
    let agent = agent_with(
        "job-5",
        ResponseTemplate::new(503).set_body_json(json!({"detail": "agent overloaded"})),
    )
    .await;
    let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");

    let err = GetJobFullResultTool
        .execute(params(&agent, "job-5"), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteHttp);
    assert_eq!(
        err.to_string(),
        "HTTP error checking job status: 503 - agent overloaded"
    );
}

#[tokio::test]
async fn every_call_fetches_fresh_status() {
    let agent = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .expect(2)
        .mount(&agent)
        .await;
    let ctx = test_context("http://127.0.0.1:9", "http://127.0.0.1:9");

    for _ in 0..2 {
        CheckJobStatusTool
            .execute(params(&agent, "job-6"), &ctx)
            .await
            .unwrap();
    }
}
