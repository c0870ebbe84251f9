//! Testnet safety gate.
//!
//! Every operation that queries or mutates network-scoped records runs
//! these checks before any request leaves the process. Only `Preprod` is
//! accepted, and registry mutations are restricted to identifiers carrying
//! the test prefix.

use serde::{Deserialize, Serialize};

use crate::error::SafetyError;

/// Prefix every registry identifier must carry to be mutated from here.
pub const TEST_IDENTIFIER_PREFIX: &str = "masumi-test-";

/// Ledger environment a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Network {
    #[default]
    Preprod,
    Mainnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preprod => "Preprod",
            Self::Mainnet => "Mainnet",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Preprod" => Ok(Self::Preprod),
            "Mainnet" => Ok(Self::Mainnet),
            _ => Err(format!(
                "invalid network '{}', expected 'Preprod' or 'Mainnet'",
                s
            )),
        }
    }
}

/// Accept only the Preprod test network.
///
/// Mainnet is a known network that is refused outright; anything else is
/// not a network at all.
pub fn validate_network(network: &str) -> Result<Network, SafetyError> {
    match network.parse::<Network>() {
        Ok(Network::Preprod) => Ok(Network::Preprod),
        Ok(Network::Mainnet) => Err(SafetyError::UnsafeNetwork),
        Err(_) => Err(SafetyError::InvalidNetwork(network.to_string())),
    }
}

/// Require the `masumi-test-` prefix on an agent name or identifier.
pub fn validate_test_identifier(identifier: &str) -> Result<(), SafetyError> {
    if identifier.starts_with(TEST_IDENTIFIER_PREFIX) {
        Ok(())
    } else {
        Err(SafetyError::NonTestIdentifier(identifier.to_string()))
    }
}
