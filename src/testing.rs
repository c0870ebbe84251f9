//! Test helpers for building an [`ExecutionContext`] against stub servers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use masumi_mcp::testing::test_context;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let server = wiremock::MockServer::start().await;
//!     let ctx = test_context(&server.uri(), &server.uri());
//!     // run a tool with &ctx
//! }
//! ```

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::config::Config;
use crate::context::{ExecutionContext, PurchaserIdGenerator};
use crate::safety::Network;

pub const TEST_REGISTRY_TOKEN: &str = "test-registry-token";
pub const TEST_PAYMENT_TOKEN: &str = "test-payment-token";

/// Seed used for the purchaser-id generator in test contexts.
pub const TEST_PURCHASER_SEED: u64 = 42;

/// Configuration pointing at the given bases, with both tokens set.
pub fn test_config(registry_base: &str, payment_base: &str) -> Config {
    Config {
        registry_base_url: Url::parse(registry_base).expect("invalid registry base in test"),
        payment_base_url: Url::parse(payment_base).expect("invalid payment base in test"),
        registry_token: Some(SecretString::from(TEST_REGISTRY_TOKEN)),
        payment_token: Some(SecretString::from(TEST_PAYMENT_TOKEN)),
        network: Network::Preprod,
        http_timeout: Duration::from_secs(5),
    }
}

/// Context with both tokens configured and a seeded purchaser-id generator.
pub fn test_context(registry_base: &str, payment_base: &str) -> ExecutionContext {
    context_from(test_config(registry_base, payment_base))
}

/// Context with neither token configured.
pub fn test_context_without_tokens(registry_base: &str, payment_base: &str) -> ExecutionContext {
    let mut config = test_config(registry_base, payment_base);
    config.registry_token = None;
    config.payment_token = None;
    context_from(config)
}

fn context_from(config: Config) -> ExecutionContext {
    ExecutionContext::from_config(&config)
        .expect("failed to build test context")
        .with_purchaser_ids(PurchaserIdGenerator::seeded(TEST_PURCHASER_SEED))
}
