//! Configuration types for warp route discovery

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ChainId, CollateralToken, Error, Result};

/// RPC endpoint for one chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_id: ChainId,

    /// Human-readable name (e.g., "ethereum")
    #[serde(default)]
    pub name: String,

    /// JSON-RPC URL (e.g., "https://eth.llamarpc.com")
    pub rpc_url: String,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Chains with an RPC endpoint. Every anchor chain needs one.
    #[serde(default)]
    pub chains: Vec<ChainConfig>,

    /// Collateral anchors, in discovery order
    #[serde(default)]
    pub tokens: Vec<CollateralToken>,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Seconds between background refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Upper bound on token fetches in flight (1 = sequential)
    #[serde(default = "default_max_concurrent_tokens")]
    pub max_concurrent_tokens: usize,

    /// Per-request RPC timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_port() -> u16 {
    19080
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_max_concurrent_tokens() -> usize {
    1
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chains: Vec::new(),
            tokens: Vec::new(),
            api_port: default_api_port(),
            refresh_interval_secs: default_refresh_interval_secs(),
            max_concurrent_tokens: default_max_concurrent_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Check the configuration for problems that would make discovery fail
    /// before any RPC call is made.
    pub fn validate(&self) -> Result<()> {
        if self.tokens.is_empty() {
            return Err(Error::Config("no collateral tokens configured".to_string()));
        }
        if self.max_concurrent_tokens == 0 {
            return Err(Error::Config(
                "maxConcurrentTokens must be at least 1".to_string(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(Error::Config(
                "refreshIntervalSecs must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "requestTimeoutSecs must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for chain in &self.chains {
            if !seen.insert(chain.chain_id) {
                return Err(Error::Config(format!(
                    "chain {} configured more than once",
                    chain.chain_id
                )));
            }
        }

        for token in &self.tokens {
            if self.chain(token.chain_id).is_none() {
                return Err(Error::Config(format!(
                    "token {} has no RPC endpoint for chain {}",
                    token.symbol, token.chain_id
                )));
            }
        }

        Ok(())
    }

    /// Look up the RPC configuration for a chain
    pub fn chain(&self, chain_id: ChainId) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }
}
