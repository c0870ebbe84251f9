//! Testnet gating and parameter limits on the registry and payment tools,
//! plus their happy paths against stub services.

use masumi_mcp::error::SafetyError;
use masumi_mcp::testing::{TEST_PAYMENT_TOKEN, TEST_REGISTRY_TOKEN, test_context};
use masumi_mcp::tools::builtin::{
    GetAgentsByWalletTool, GetPurchaseHistoryTool, QueryPaymentsTool, QueryRegistryTool,
    RegisterAgentTool, UnregisterAgentTool,
};
use masumi_mcp::tools::{ErrorKind, Tool, ToolError};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A stub that fails the test if it receives any request.
async fn silent_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    server
}

fn registration(name: &str, network: &str) -> Value {
    json!({
        "network": network,
        "name": name,
        "api_base_url": "https://agent.example",
        "selling_wallet_vkey": "vkey_test_seller",
        "capability_name": "Content Writing",
        "capability_version": "1.0.0",
        "base_price": 1000000
    })
}

fn call(tool: impl Tool + 'static, params: Value) -> (Box<dyn Tool>, Value) {
    (Box::new(tool), params)
}

fn gated_calls(network: &str) -> Vec<(Box<dyn Tool>, Value)> {
    vec![
        call(QueryPaymentsTool, json!({"network": network})),
        call(GetPurchaseHistoryTool, json!({"network": network})),
        call(QueryRegistryTool, json!({"network": network})),
        call(RegisterAgentTool, registration("masumi-test-writer", network)),
        call(
            UnregisterAgentTool,
            json!({"network": network, "agent_identifier": "masumi-test-writer"}),
        ),
        call(
            GetAgentsByWalletTool,
            json!({"network": network, "wallet_vkey": "vkey"}),
        ),
    ]
}

#[tokio::test]
async fn mainnet_is_rejected_without_http() {
    let server = silent_server().await;
    let ctx = test_context(&server.uri(), &server.uri());

    for (tool, params) in gated_calls("Mainnet") {
        let err = tool.execute(params, &ctx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SafetyRejected, "{}", tool.name());
        assert!(
            matches!(err, ToolError::Safety(SafetyError::UnsafeNetwork)),
            "{}: {err}",
            tool.name()
        );
    }
}

#[tokio::test]
async fn unknown_network_is_rejected_without_http() {
    let server = silent_server().await;
    let ctx = test_context(&server.uri(), &server.uri());

    for (tool, params) in gated_calls("Testnet") {
        let err = tool.execute(params, &ctx).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only Preprod network allowed in testing, got: Testnet",
            "{}",
            tool.name()
        );
    }
}

#[tokio::test]
async fn limit_out_of_range_is_rejected_without_http() {
    let server = silent_server().await;
    let ctx = test_context(&server.uri(), &server.uri());

    for limit in [0, 101, -5] {
        let err = QueryPaymentsTool
            .execute(json!({"network": "Preprod", "limit": limit}), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
        assert!(
            err.to_string()
                .contains(&format!("Limit must be between 1 and 100, got: {limit}"))
        );
    }
}

#[tokio::test]
async fn limit_bounds_are_inclusive() {
    let payment = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/purchase/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "data": {"entries": []}})),
        )
        .expect(2)
        .mount(&payment)
        .await;
    let ctx = test_context("http://127.0.0.1:9", &payment.uri());

    for limit in [1, 100] {
        let output = GetPurchaseHistoryTool
            .execute(json!({"network": "Preprod", "limit": limit}), &ctx)
            .await
            .unwrap();
        assert_eq!(output.result["count"], json!(0));
    }
}

#[tokio::test]
async fn long_contract_address_is_rejected_without_http() {
    let server = silent_server().await;
    let ctx = test_context(&server.uri(), &server.uri());
    let address = "a".repeat(251);

    let err = QueryRegistryTool
        .execute(
            json!({"network": "Preprod", "smart_contract_address": address}),
            &ctx,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
    assert!(err.to_string().contains("max 250 chars"));
}

#[tokio::test]
async fn production_name_is_not_registered() {
    let server = silent_server().await;
    let ctx = test_context(&server.uri(), &server.uri());

    let err = RegisterAgentTool
        .execute(registration("production-agent", "Preprod"), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ToolError::Safety(SafetyError::NonTestIdentifier(ref id)) if id == "production-agent"
    ));
}

#[tokio::test]
async fn production_identifier_is_not_unregistered() {
    let server = silent_server().await;
    let ctx = test_context(&server.uri(), &server.uri());

    let err = UnregisterAgentTool
        .execute(
            json!({"network": "Preprod", "agent_identifier": "prod-agent-1"}),
            &ctx,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SafetyRejected);
}

#[tokio::test]
async fn query_payments_passes_records_through() {
    let payment = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/payment/"))
        .and(header("token", TEST_PAYMENT_TOKEN))
        .and(query_param("network", "Preprod"))
        .and(query_param("limit", "5"))
        .and(query_param("includeHistory", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"entries": [{"id": "p1"}]}
        })))
        .expect(1)
        .mount(&payment)
        .await;

    let ctx = test_context("http://127.0.0.1:9", &payment.uri());
    let output = QueryPaymentsTool
        .execute(json!({"network": "Preprod", "limit": 5}), &ctx)
        .await
        .unwrap();

    assert_eq!(
        output.result,
        json!({
            "status": "success",
            "count": 1,
            "network": "Preprod",
            "payments": [{"id": "p1"}]
        })
    );
}

#[tokio::test]
async fn payment_envelope_failure_is_protocol_error() {
    let payment = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "error"})))
        .mount(&payment)
        .await;

    let ctx = test_context("http://127.0.0.1:9", &payment.uri());
    let err = QueryPaymentsTool
        .execute(json!({"network": "Preprod"}), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteProtocol);
    assert_eq!(
        err.to_string(),
        "Payment API did not return success status: error"
    );
}

#[tokio::test]
async fn purchase_history_includes_summary() {
    let payment = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/purchase/"))
        .and(query_param("cursorId", "cur-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"entries": [{"id": "pu1", "agentIdentifier": "agent-1"}]}
        })))
        .expect(1)
        .mount(&payment)
        .await;

    let ctx = test_context("http://127.0.0.1:9", &payment.uri());
    let output = GetPurchaseHistoryTool
        .execute(json!({"network": "Preprod", "cursor_id": "cur-7"}), &ctx)
        .await
        .unwrap();

    assert_eq!(output.result["count"], json!(1));
    assert_eq!(output.result["cursor_id"], json!("cur-7"));
    assert_eq!(output.result["purchase_summary"][0]["id"], json!("pu1"));
}

#[tokio::test]
async fn wallet_not_found_is_empty_success() {
    let registry = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/registry/wallet/"))
        .and(query_param("walletVkey", "vkey_unknown"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&registry)
        .await;

    let ctx = test_context(&registry.uri(), "http://127.0.0.1:9");
    let output = GetAgentsByWalletTool
        .execute(
            json!({"network": "Preprod", "wallet_vkey": "vkey_unknown"}),
            &ctx,
        )
        .await
        .unwrap();

    assert_eq!(output.result["status"], json!("success"));
    assert_eq!(output.result["count"], json!(0));
    assert_eq!(output.result["agents"], json!([]));
    assert_eq!(
        output.result["message"],
        json!("No agents found for this wallet")
    );
}

#[tokio::test]
async fn register_posts_registry_entry() {
    let registry = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/registry-entry/"))
        .and(header("token", TEST_REGISTRY_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"id": "entry-1"}
        })))
        .expect(1)
        .mount(&registry)
        .await;

    let ctx = test_context(&registry.uri(), "http://127.0.0.1:9");
    let mut params = registration("masumi-test-writer", "Preprod");
    params["tags"] = json!(["writing"]);
    let output = RegisterAgentTool.execute(params, &ctx).await.unwrap();

    assert_eq!(
        output.result["agent_details"],
        json!({
            "name": "masumi-test-writer",
            "api_base_url": "https://agent.example",
            "capability": "Content Writing v1.0.0",
            "base_price": "1000000 lovelace",
            "tags": ["writing"]
        })
    );
    assert_eq!(output.result["registration_data"], json!({"id": "entry-1"}));

    let requests = registry.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["Capability"], json!({"name": "Content Writing", "version": "1.0.0"}));
    assert_eq!(body["AgentPricing"]["currency"], json!("ADA"));
    assert_eq!(body["sellingWalletVkey"], json!("vkey_test_seller"));
}

#[tokio::test]
async fn unregister_sends_delete_with_body() {
    let registry = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/registry-entry/"))
        .and(body_json(json!({
            "agentIdentifier": "masumi-test-writer",
            "network": "Preprod"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&registry)
        .await;

    let ctx = test_context(&registry.uri(), "http://127.0.0.1:9");
    let output = UnregisterAgentTool
        .execute(
            json!({"network": "Preprod", "agent_identifier": "masumi-test-writer"}),
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(output.result["unregistration_data"], json!({}));
    assert_eq!(output.result["agent_identifier"], json!("masumi-test-writer"));
}

#[tokio::test]
async fn unregister_missing_agent_is_not_found() {
    let registry = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&registry)
        .await;

    let ctx = test_context(&registry.uri(), "http://127.0.0.1:9");
    let err = UnregisterAgentTool
        .execute(
            json!({"network": "Preprod", "agent_identifier": "masumi-test-gone"}),
            &ctx,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(
        err.to_string(),
        "Agent 'masumi-test-gone' not found in registry"
    );
}
