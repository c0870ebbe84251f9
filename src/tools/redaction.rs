//! Masking of credentials in payloads before they reach the logs.

use serde_json::{Map, Value};

const REDACTED: &str = "[REDACTED]";
const SENSITIVE_EXACT: &[&str] = &[
    "token",
    "authorization",
    "api_key",
    "apikey",
    "password",
    "secret",
    "private_key",
    "signingkey",
    "mnemonic",
];
const SENSITIVE_SUBSTRINGS: &[&str] = &["token", "secret", "password", "mnemonic", "privatekey"];

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    if SENSITIVE_EXACT.contains(&lower.as_str()) {
        return true;
    }
    SENSITIVE_SUBSTRINGS.iter().any(|s| lower.contains(s))
}

fn redact_in_place(value: &mut Value) {
    match value {
        Value::Object(map) => redact_object(map),
        Value::Array(items) => {
            for item in items {
                redact_in_place(item);
            }
        }
        _ => {}
    }
}

fn redact_object(map: &mut Map<String, Value>) {
    for (key, val) in map {
        if is_sensitive_key(key) {
            *val = Value::String(REDACTED.to_string());
        } else {
            redact_in_place(val);
        }
    }
}

/// Copy of `value` with credential-like fields replaced by `[REDACTED]`.
///
/// Wallet verification keys and blockchain identifiers are public and kept.
pub fn redact_sensitive_json(value: &Value) -> Value {
    let mut cloned = value.clone();
    redact_in_place(&mut cloned);
    cloned
}

#[cfg(test)]
mod tests {
    use super::redact_sensitive_json;

    #[test]
    fn redacts_token_fields() {
        let input = serde_json::json!({
            "token": "pay-secret",
            "registryToken": "reg-secret",
            "network": "Preprod"
        });
        let out = redact_sensitive_json(&input);
        assert_eq!(out["token"], "[REDACTED]");
        assert_eq!(out["registryToken"], "[REDACTED]");
        assert_eq!(out["network"], "Preprod");
    }

    #[test]
    fn keeps_public_purchase_fields() {
        let input = serde_json::json!({
            "identifierFromPurchaser": "example_purchaser_123",
            "sellerVkey": "vkey",
            "blockchainIdentifier": "bc",
            "nested": [{"walletMnemonic": "words"}, {"inputHash": "h"}]
        });
        let out = redact_sensitive_json(&input);
        assert_eq!(out["sellerVkey"], "vkey");
        assert_eq!(out["blockchainIdentifier"], "bc");
        assert_eq!(out["nested"][0]["walletMnemonic"], "[REDACTED]");
        assert_eq!(out["nested"][1]["inputHash"], "h");
    }
}
