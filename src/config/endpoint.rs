//! RPC endpoint configuration

use crate::error::RpcError;
use crate::ledger::RpcEndpoint;
use serde::{Deserialize, Serialize};

/// Configuration for the Starknet RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// RPC URL
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Retries for transient failures
    #[serde(default = "default_retries")]
    pub retry_attempts: u32,
}

pub(crate) fn default_timeout() -> u64 {
    30
}

pub(crate) fn default_retries() -> u32 {
    3
}

impl EndpointConfig {
    /// Create a new endpoint config with defaults
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: default_timeout(),
            retry_attempts: default_retries(),
        }
    }

    /// Builder-style setter for the timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Builder-style setter for retries
    pub fn with_retries(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Open a client for this endpoint
    pub fn connect(&self) -> Result<RpcEndpoint, RpcError> {
        RpcEndpoint::new(self.url.clone(), self.timeout_seconds, self.retry_attempts)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::new("http://localhost:9545")
    }
}
