//! Configuration loaded from the environment.
//!
//! `.env` files are loaded by `main` via dotenvy before [`Config::from_env`]
//! runs, so values can come from either source. The two base URLs are the
//! only hard requirements; missing tokens degrade to per-call errors.

pub(crate) mod helpers;

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::config::helpers::{optional_env, parse_optional_env, required_env};
use crate::error::ConfigError;
use crate::safety::Network;

pub const REGISTRY_BASE_URL_VAR: &str = "MASUMI_REGISTRY_BASE_URL";
pub const PAYMENT_BASE_URL_VAR: &str = "MASUMI_PAYMENT_BASE_URL";
pub const REGISTRY_TOKEN_VAR: &str = "MASUMI_REGISTRY_TOKEN";
pub const PAYMENT_TOKEN_VAR: &str = "MASUMI_PAYMENT_TOKEN";
pub const NETWORK_VAR: &str = "MASUMI_NETWORK";
pub const HTTP_TIMEOUT_VAR: &str = "MASUMI_HTTP_TIMEOUT_SECS";

/// Default timeout applied to every outbound request.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    pub registry_base_url: Url,
    pub payment_base_url: Url,
    pub registry_token: Option<SecretString>,
    pub payment_token: Option<SecretString>,
    /// Network used by operations that take no explicit network argument.
    pub network: Network,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("registry_base_url", &self.registry_base_url.as_str())
            .field("payment_base_url", &self.payment_base_url.as_str())
            .field("registry_token", &self.registry_token.is_some())
            .field("payment_token", &self.payment_token.is_some())
            .field("network", &self.network)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Config {
    /// Resolve configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let registry_base_url = parse_base_url(
            REGISTRY_BASE_URL_VAR,
            &required_env(
                REGISTRY_BASE_URL_VAR,
                "Set it in the environment or in a .env file",
            )?,
        )?;
        let payment_base_url = parse_base_url(
            PAYMENT_BASE_URL_VAR,
            &required_env(
                PAYMENT_BASE_URL_VAR,
                "Set it in the environment or in a .env file",
            )?,
        )?;

        let registry_token = optional_env(REGISTRY_TOKEN_VAR)?.map(SecretString::from);
        let payment_token = optional_env(PAYMENT_TOKEN_VAR)?.map(SecretString::from);

        let network = parse_optional_env(NETWORK_VAR, Network::Preprod)?;
        let timeout_secs = parse_optional_env(HTTP_TIMEOUT_VAR, DEFAULT_HTTP_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: HTTP_TIMEOUT_VAR.to_string(),
                message: "must be at least 1 second".to_string(),
            });
        }

        Ok(Self {
            registry_base_url,
            payment_base_url,
            registry_token,
            payment_token,
            network,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Log warnings for optional settings that will make some tools fail.
    pub fn warn_on_gaps(&self) {
        if self.registry_token.is_none() {
            tracing::warn!(
                "{} not set; registry tools will return configuration errors",
                REGISTRY_TOKEN_VAR
            );
        }
        if self.payment_token.is_none() {
            tracing::warn!(
                "{} not set; payment and hiring tools will return configuration errors",
                PAYMENT_TOKEN_VAR
            );
        }
        if self.network == Network::Mainnet {
            tracing::warn!("Configured network is Mainnet; hiring will spend real funds");
        }
    }
}

fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("not a valid URL: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}
