//! evm-chain-client: Read-only EVM access for route discovery
//!
//! This crate provides the chain transport used by discovery: one HTTP
//! provider per configured chain, typed bridge and asset contract reads, and a
//! per-request timeout so a stuck node cannot stall a discovery pass forever.

pub mod contracts;
pub mod probe;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use url::Url;
use warp_core::{AppConfig, ChainConfig, ChainError, ChainId};

use crate::contracts::{IERC20Metadata, IHypCollateral};

pub use probe::{probe_chain, ChainStatus};

/// Default timeout for RPC calls (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for chain client operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// Read capabilities discovery needs from the chains it visits.
///
/// Every call is addressed by chain id; implementations route it to the
/// matching endpoint.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `wrappedToken()` on a collateral contract
    async fn wrapped_token(&self, chain_id: ChainId, collateral: Address) -> Result<Address>;

    /// `domains()` on a collateral contract
    async fn domains(&self, chain_id: ChainId, collateral: Address) -> Result<Vec<ChainId>>;

    /// `routers(domain)` on a collateral contract
    async fn router(&self, chain_id: ChainId, collateral: Address, domain: ChainId)
        -> Result<B256>;

    /// `decimals()` on an ERC-20
    async fn decimals(&self, chain_id: ChainId, token: Address) -> Result<u8>;

    /// `symbol()` on an ERC-20
    async fn symbol(&self, chain_id: ChainId, token: Address) -> Result<String>;

    /// Probe the endpoint serving a chain
    async fn chain_status(&self, chain_id: ChainId) -> ChainStatus;
}

/// JSON-RPC backed [`ChainReader`]
#[derive(Clone)]
pub struct EvmChainClient {
    providers: Arc<HashMap<ChainId, DynProvider>>,
    timeout: Duration,
}

impl EvmChainClient {
    /// Create a client with one HTTP provider per configured chain.
    ///
    /// No request is made here; unreachable endpoints surface on first use.
    pub fn new(chains: &[ChainConfig], timeout: Duration) -> Result<Self> {
        let mut providers = HashMap::with_capacity(chains.len());
        for chain in chains {
            let url: Url = chain
                .rpc_url
                .parse()
                .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl {
                    chain_id: chain.chain_id,
                    url: chain.rpc_url.clone(),
                    reason: e.to_string(),
                })?;
            let provider = ProviderBuilder::new().connect_http(url).erased();
            providers.insert(chain.chain_id, provider);
        }

        tracing::debug!(chains = providers.len(), "EVM chain client created");

        Ok(Self {
            providers: Arc::new(providers),
            timeout,
        })
    }

    /// Create from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.chains,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn provider(&self, chain_id: ChainId) -> Result<&DynProvider> {
        self.providers
            .get(&chain_id)
            .ok_or(ChainError::UnknownChain { chain_id })
    }

    async fn timed_request<T, E: std::fmt::Display>(
        &self,
        chain_id: ChainId,
        call: &'static str,
        fut: impl std::future::IntoFuture<Output = std::result::Result<T, E>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| ChainError::Timeout {
                chain_id,
                call,
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| ChainError::Rpc {
                chain_id,
                call,
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl ChainReader for EvmChainClient {
    async fn wrapped_token(&self, chain_id: ChainId, collateral: Address) -> Result<Address> {
        let contract = IHypCollateral::new(collateral, self.provider(chain_id)?);
        self.timed_request(chain_id, "wrappedToken", contract.wrappedToken().call())
            .await
    }

    async fn domains(&self, chain_id: ChainId, collateral: Address) -> Result<Vec<ChainId>> {
        let contract = IHypCollateral::new(collateral, self.provider(chain_id)?);
        self.timed_request(chain_id, "domains", contract.domains().call())
            .await
    }

    async fn router(
        &self,
        chain_id: ChainId,
        collateral: Address,
        domain: ChainId,
    ) -> Result<B256> {
        let contract = IHypCollateral::new(collateral, self.provider(chain_id)?);
        self.timed_request(chain_id, "routers", contract.routers(domain).call())
            .await
    }

    async fn decimals(&self, chain_id: ChainId, token: Address) -> Result<u8> {
        let contract = IERC20Metadata::new(token, self.provider(chain_id)?);
        self.timed_request(chain_id, "decimals", contract.decimals().call())
            .await
    }

    async fn symbol(&self, chain_id: ChainId, token: Address) -> Result<String> {
        let contract = IERC20Metadata::new(token, self.provider(chain_id)?);
        self.timed_request(chain_id, "symbol", contract.symbol().call())
            .await
    }

    async fn chain_status(&self, chain_id: ChainId) -> ChainStatus {
        match self.provider(chain_id) {
            Ok(provider) => probe_chain(provider, chain_id, self.timeout).await,
            Err(_) => ChainStatus::offline(chain_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(chain_id: ChainId, rpc_url: &str) -> ChainConfig {
        ChainConfig {
            chain_id,
            name: format!("chain-{}", chain_id),
            rpc_url: rpc_url.to_string(),
        }
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let err = EvmChainClient::new(&[chain(1, "not a url")], DEFAULT_REQUEST_TIMEOUT)
            .err()
            .unwrap();
        assert!(matches!(err, ChainError::InvalidRpcUrl { chain_id: 1, .. }));
    }

    #[test]
    fn test_new_accepts_multiple_chains() {
        let client = EvmChainClient::new(
            &[
                chain(10, "http://127.0.0.1:8546"),
                chain(1, "http://127.0.0.1:8545"),
            ],
            DEFAULT_REQUEST_TIMEOUT,
        );
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_chain_fails_without_request() {
        let client =
            EvmChainClient::new(&[chain(1, "http://127.0.0.1:8545")], DEFAULT_REQUEST_TIMEOUT)
                .unwrap();
        let err = client
            .domains(99, Address::repeat_byte(0x11))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::UnknownChain { chain_id: 99 }));

        let status = client.chain_status(99).await;
        assert!(!status.is_online);
    }
}
