//! Caller configuration.

use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::CallError;
use crate::multicall::DEFAULT_MULTICALL3_ADDRESS;

/// Serializable settings for a [`Caller`](crate::Caller).
///
/// ```json
/// { "rpc_url": "https://eth.llamarpc.com", "chunk_size": 100, "cooldown_ms": 250 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerConfig {
    /// HTTP(S) JSON-RPC endpoint
    pub rpc_url: String,
    /// Multicall3 contract address, hex with `0x` prefix
    #[serde(default = "default_multicall_address")]
    pub multicall_address: String,
    /// Calls per aggregate request for `call_batched` (0 = no split)
    #[serde(default)]
    pub chunk_size: usize,
    /// Pause between aggregate requests, in milliseconds
    #[serde(default)]
    pub cooldown_ms: u64,
    /// HTTP request timeout, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_multicall_address() -> String {
    DEFAULT_MULTICALL3_ADDRESS.to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl CallerConfig {
    /// Config for `rpc_url` with every other field at its default.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            multicall_address: default_multicall_address(),
            chunk_size: 0,
            cooldown_ms: 0,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, CallError> {
        serde_json::from_str(json).map_err(|e| CallError::Config(e.to_string()))
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The parsed Multicall3 address.
    pub fn multicall_address(&self) -> Result<Address, CallError> {
        self.multicall_address.parse().map_err(|e| {
            CallError::Config(format!(
                "invalid multicall address '{}': {e}",
                self.multicall_address
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multicall::MULTICALL3_ADDRESS;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = CallerConfig::from_json(r#"{"rpc_url": "http://localhost:8545"}"#).unwrap();
        assert_eq!(cfg, CallerConfig::new("http://localhost:8545"));
        assert_eq!(cfg.chunk_size, 0);
        assert_eq!(cfg.cooldown(), Duration::ZERO);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.multicall_address().unwrap(), MULTICALL3_ADDRESS);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let cfg = CallerConfig::from_json(
            r#"{
                "rpc_url": "https://rpc.example.com",
                "multicall_address": "0x1111111111111111111111111111111111111111",
                "chunk_size": 50,
                "cooldown_ms": 250,
                "request_timeout_ms": 5000
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.chunk_size, 50);
        assert_eq!(cfg.cooldown(), Duration::from_millis(250));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.multicall_address().unwrap(), Address::repeat_byte(0x11));
    }

    #[test]
    fn missing_rpc_url_is_config_error() {
        let err = CallerConfig::from_json("{}").unwrap_err();
        assert!(matches!(err, CallError::Config(_)));
    }

    #[test]
    fn bad_address_is_config_error() {
        let mut cfg = CallerConfig::new("http://localhost:8545");
        cfg.multicall_address = "0x1234".into();
        let err = cfg.multicall_address().unwrap_err();
        assert!(err.to_string().contains("invalid multicall address '0x1234'"));
    }
}
