//! In-memory chain reader for tests
//!
//! Serves bridge and asset reads from fixtures so discovery can run without a
//! node. Enabled for this crate's tests and, through the `test-utils`
//! feature, for downstream crates.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use evm_chain_client::{ChainReader, ChainStatus, Result};
use tokio::sync::Semaphore;
use warp_core::{ChainError, ChainId, CollateralToken};

#[derive(Debug, Clone)]
struct MockCollateral {
    wrapped: Address,
    domains: Vec<ChainId>,
    routers: HashMap<ChainId, B256>,
}

/// Fixture-backed [`ChainReader`]
#[derive(Debug, Default)]
pub struct MockChainReader {
    collaterals: HashMap<(ChainId, Address), MockCollateral>,
    assets: HashMap<(ChainId, Address), (u8, String)>,
    failing_chains: HashSet<ChainId>,
    offline: AtomicBool,
    delay: Option<Duration>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    wrapped_token_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collateral contract with one remote router per link, in
    /// enumeration order
    pub fn with_collateral(
        mut self,
        chain_id: ChainId,
        collateral: Address,
        wrapped: Address,
        links: &[(ChainId, Address)],
    ) -> Self {
        let entry = MockCollateral {
            wrapped,
            domains: links.iter().map(|(id, _)| *id).collect(),
            routers: links
                .iter()
                .map(|(id, addr)| (*id, addr.into_word()))
                .collect(),
        };
        self.collaterals.insert((chain_id, collateral), entry);
        self
    }

    /// Override the raw router word a collateral reports for `domain`
    pub fn with_raw_router(
        mut self,
        chain_id: ChainId,
        collateral: Address,
        domain: ChainId,
        word: B256,
    ) -> Self {
        if let Some(entry) = self.collaterals.get_mut(&(chain_id, collateral)) {
            if !entry.domains.contains(&domain) {
                entry.domains.push(domain);
            }
            entry.routers.insert(domain, word);
        }
        self
    }

    /// Override the domain list a collateral enumerates
    pub fn with_domains(mut self, chain_id: ChainId, collateral: Address, domains: &[ChainId]) -> Self {
        if let Some(entry) = self.collaterals.get_mut(&(chain_id, collateral)) {
            entry.domains = domains.to_vec();
        }
        self
    }

    /// Register ERC-20 metadata for an asset
    pub fn with_asset(mut self, chain_id: ChainId, token: Address, decimals: u8, symbol: &str) -> Self {
        self.assets.insert((chain_id, token), (decimals, symbol.to_string()));
        self
    }

    /// Every read against `chain_id` fails with an RPC error
    pub fn with_failing_chain(mut self, chain_id: ChainId) -> Self {
        self.failing_chains.insert(chain_id);
        self
    }

    /// Take every chain down (or bring them back) after construction
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Sleep this long inside every `wrapped_token` read
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make `wrapped_token` reads wait for a permit from `gate`.
    ///
    /// The gate is captured when the read starts; replacing it does not
    /// release reads already waiting.
    pub fn set_gate(&self, gate: Option<Arc<Semaphore>>) {
        if let Ok(mut current) = self.gate.lock() {
            *current = gate;
        }
    }

    /// Number of `wrapped_token` reads started so far
    pub fn wrapped_token_calls(&self) -> usize {
        self.wrapped_token_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `wrapped_token` reads observed in flight at once.
    ///
    /// Each token fetch starts with exactly one such read, so with a delay
    /// configured this approximates the number of tokens fetched concurrently.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn check_chain(&self, chain_id: ChainId, call: &'static str) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) || self.failing_chains.contains(&chain_id) {
            return Err(ChainError::Rpc {
                chain_id,
                call,
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn collateral(&self, chain_id: ChainId, collateral: Address, call: &'static str) -> Result<&MockCollateral> {
        self.check_chain(chain_id, call)?;
        self.collaterals
            .get(&(chain_id, collateral))
            .ok_or_else(|| ChainError::Rpc {
                chain_id,
                call,
                message: "execution reverted".to_string(),
            })
    }

    fn asset(&self, chain_id: ChainId, token: Address, call: &'static str) -> Result<&(u8, String)> {
        self.check_chain(chain_id, call)?;
        self.assets
            .get(&(chain_id, token))
            .ok_or_else(|| ChainError::Rpc {
                chain_id,
                call,
                message: "execution reverted".to_string(),
            })
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn wrapped_token(&self, chain_id: ChainId, collateral: Address) -> Result<Address> {
        self.wrapped_token_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().ok().and_then(|g| g.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.collateral(chain_id, collateral, "wrappedToken")
            .map(|c| c.wrapped)
    }

    async fn domains(&self, chain_id: ChainId, collateral: Address) -> Result<Vec<ChainId>> {
        self.collateral(chain_id, collateral, "domains")
            .map(|c| c.domains.clone())
    }

    async fn router(&self, chain_id: ChainId, collateral: Address, domain: ChainId) -> Result<B256> {
        let entry = self.collateral(chain_id, collateral, "routers")?;
        entry.routers.get(&domain).copied().ok_or_else(|| ChainError::Rpc {
            chain_id,
            call: "routers",
            message: "execution reverted".to_string(),
        })
    }

    async fn decimals(&self, chain_id: ChainId, token: Address) -> Result<u8> {
        self.asset(chain_id, token, "decimals").map(|(d, _)| *d)
    }

    async fn symbol(&self, chain_id: ChainId, token: Address) -> Result<String> {
        self.asset(chain_id, token, "symbol").map(|(_, s)| s.clone())
    }

    async fn chain_status(&self, chain_id: ChainId) -> ChainStatus {
        if self.failing_chains.contains(&chain_id) {
            return ChainStatus::offline(chain_id);
        }
        ChainStatus {
            chain_id,
            is_online: true,
            block_number: Some(1),
            rpc_chain_id: Some(u64::from(chain_id)),
        }
    }
}

/// Configured collateral anchor with no expected wrapped address
pub fn collateral_token(chain_id: ChainId, symbol: &str, decimals: u8, collateral: Address) -> CollateralToken {
    CollateralToken {
        chain_id,
        symbol: symbol.to_string(),
        decimals,
        hyp_collateral_address: collateral,
        native_token_address: None,
    }
}
