//! Shared execution context handed to every tool invocation.
//!
//! Built once at startup from [`Config`] and shared behind an `Arc`. It owns
//! the pooled HTTP client, the resolved remote endpoints, the service tokens
//! and the purchaser-identifier generator. Nothing in here changes after
//! construction apart from the generator's RNG state.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::Config;
use crate::error::ConfigError;
use crate::safety::Network;
use crate::tools::ToolError;

/// Prefix of every generated purchaser identifier.
pub const PURCHASER_ID_PREFIX: &str = "example_purchaser_";

/// Resolved remote endpoints.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// `{registry}/api/v1/registry-entry/`
    pub registry_entry: Url,
    /// `{registry}/api/v1/registry/wallet/`
    pub registry_wallet: Url,
    /// `{payment}/api/v1/purchase/`
    pub purchase: Url,
    /// `{payment}/api/v1/payment/`
    pub payment: Url,
}

impl Endpoints {
    pub fn new(registry_base: &Url, payment_base: &Url) -> Result<Self, ConfigError> {
        Ok(Self {
            registry_entry: endpoint(registry_base, "api/v1/registry-entry/")?,
            registry_wallet: endpoint(registry_base, "api/v1/registry/wallet/")?,
            purchase: endpoint(payment_base, "api/v1/purchase/")?,
            payment: endpoint(payment_base, "api/v1/payment/")?,
        })
    }
}

/// Append `path` to `base`, keeping any path prefix the base already has.
fn endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|e| ConfigError::InvalidValue {
        key: base.to_string(),
        message: format!("cannot build endpoint '{path}': {e}"),
    })
}

/// Generates `example_purchaser_NNN` identifiers.
///
/// Three uniformly drawn digits give only 1000 distinct values; collisions
/// between concurrent hires are accepted.
pub struct PurchaserIdGenerator {
    rng: Mutex<StdRng>,
}

impl PurchaserIdGenerator {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn next_id(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let suffix: String = (0..3)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        format!("{PURCHASER_ID_PREFIX}{suffix}")
    }
}

impl std::fmt::Debug for PurchaserIdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaserIdGenerator").finish_non_exhaustive()
    }
}

/// Everything a tool needs to talk to the marketplace.
pub struct ExecutionContext {
    pub http: Client,
    pub endpoints: Endpoints,
    registry_token: Option<SecretString>,
    payment_token: Option<SecretString>,
    /// Network used by `list_agents` and `hire_agent`.
    pub network: Network,
    pub purchaser_ids: PurchaserIdGenerator,
}

impl ExecutionContext {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            endpoints: Endpoints::new(&config.registry_base_url, &config.payment_base_url)?,
            registry_token: config.registry_token.clone(),
            payment_token: config.payment_token.clone(),
            network: config.network,
            purchaser_ids: PurchaserIdGenerator::from_entropy(),
        })
    }

    /// Replace the purchaser-id generator.
    pub fn with_purchaser_ids(mut self, generator: PurchaserIdGenerator) -> Self {
        self.purchaser_ids = generator;
        self
    }

    pub fn registry_token(&self) -> Result<&str, ToolError> {
        self.registry_token
            .as_ref()
            .map(|t| t.expose_secret())
            .ok_or_else(|| {
                tracing::error!("Masumi Registry Token is not configured");
                ToolError::NotConfigured("Masumi Registry Token is not configured.".to_string())
            })
    }

    pub fn payment_token(&self) -> Result<&str, ToolError> {
        self.payment_token
            .as_ref()
            .map(|t| t.expose_secret())
            .ok_or_else(|| {
                tracing::error!("Masumi Payment Token is not configured");
                ToolError::NotConfigured("Masumi Payment Token is not configured.".to_string())
            })
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("endpoints", &self.endpoints)
            .field("registry_token", &self.registry_token.is_some())
            .field("payment_token", &self.payment_token.is_some())
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}
