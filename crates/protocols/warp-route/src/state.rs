//! Warp Route State Types
//!
//! Routes, the route map, snapshots, and the protocol error type.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warp_core::{ChainError, ChainId, EnrichedToken};

/// Direction of a route relative to the collateral anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteType {
    /// Collateral chain to a remote representation
    NativeToRemote,
    /// Remote representation back to the collateral chain
    RemoteToNative,
    /// Between two remote representations of the same collateral
    RemoteToRemote,
}

impl RouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeToRemote => "NativeToRemote",
            Self::RemoteToNative => "RemoteToNative",
            Self::RemoteToRemote => "RemoteToRemote",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transfer path between two chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(rename = "type")]
    pub route_type: RouteType,
    pub native_chain_id: ChainId,
    pub native_token_address: Address,
    pub hyp_collateral_address: Address,
    pub source_token_address: Address,
    pub dest_token_address: Address,
    pub decimals: u8,
}

impl Route {
    /// Build a route whose anchor fields come from `token`
    pub fn from_token(
        route_type: RouteType,
        token: &EnrichedToken,
        source_token_address: Address,
        dest_token_address: Address,
    ) -> Self {
        Self {
            route_type,
            native_chain_id: token.chain_id,
            native_token_address: token.native_token_address,
            hyp_collateral_address: token.hyp_collateral_address,
            source_token_address,
            dest_token_address,
            decimals: token.decimals,
        }
    }
}

/// Routes keyed by source chain, then destination chain.
///
/// Every ordered pair of distinct chains in the discovered universe has an
/// entry, possibly empty. No chain is paired with itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteMap(BTreeMap<ChainId, BTreeMap<ChainId, Vec<Route>>>);

impl RouteMap {
    /// Pre-populate an empty entry for every ordered pair of distinct chains
    pub(crate) fn with_universe(universe: &BTreeSet<ChainId>) -> Self {
        let mut outer = BTreeMap::new();
        for &src in universe {
            let inner: BTreeMap<ChainId, Vec<Route>> = universe
                .iter()
                .filter(|&&dst| dst != src)
                .map(|&dst| (dst, Vec::new()))
                .collect();
            outer.insert(src, inner);
        }
        Self(outer)
    }

    /// Append a route to an existing pair.
    ///
    /// # Panics
    /// If the pair was not pre-populated.
    pub(crate) fn push(&mut self, src: ChainId, dst: ChainId, route: Route) {
        let routes = self
            .0
            .get_mut(&src)
            .and_then(|inner| inner.get_mut(&dst))
            .unwrap_or_else(|| panic!("route pair {} -> {} outside the chain universe", src, dst));
        routes.push(route);
    }

    /// Routes from `src` to `dst`, if both chains are in the universe
    pub fn get(&self, src: ChainId, dst: ChainId) -> Option<&Vec<Route>> {
        self.0.get(&src)?.get(&dst)
    }

    /// Whether `chain_id` is part of the universe
    pub fn contains_chain(&self, chain_id: ChainId) -> bool {
        self.0.contains_key(&chain_id)
    }

    /// Top-level chain ids, ascending
    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.0.keys().copied()
    }

    /// Number of chains in the universe
    pub fn chain_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every `(src, dst, routes)` entry, including empty ones
    pub fn pairs(&self) -> impl Iterator<Item = (ChainId, ChainId, &[Route])> + '_ {
        self.0.iter().flat_map(|(&src, inner)| {
            inner
                .iter()
                .map(move |(&dst, routes)| (src, dst, routes.as_slice()))
        })
    }

    /// Every route in the map
    pub fn routes(&self) -> impl Iterator<Item = &Route> + '_ {
        self.0.values().flat_map(|inner| inner.values().flatten())
    }
}

/// Summary counts of a route map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub chains: usize,
    /// Collateral anchors
    pub tokens: usize,
    pub remote_links: usize,
    pub native_to_remote: usize,
    pub remote_to_native: usize,
    pub remote_to_remote: usize,
}

/// A completed discovery pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSnapshot {
    /// Refresh generation that produced this snapshot
    pub generation: u64,
    /// Unix timestamp (seconds) when the map was built
    pub built_at: u64,
    pub tokens: Vec<EnrichedToken>,
    pub routes: RouteMap,
}

impl RouteSnapshot {
    pub fn new(generation: u64, tokens: Vec<EnrichedToken>, routes: RouteMap) -> Self {
        let built_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            generation,
            built_at,
            tokens,
            routes,
        }
    }

    /// Route counts, with anchors and links taken from the fetched tokens so
    /// that anchors without links are counted too
    pub fn stats(&self) -> RouteStats {
        RouteStats {
            tokens: self.tokens.len(),
            remote_links: self.tokens.iter().map(|t| t.hyp_tokens.len()).sum(),
            ..crate::router::route_stats(&self.routes)
        }
    }

    /// Chains hosting a collateral anchor, in token order
    pub fn anchor_chain_ids(&self) -> Vec<ChainId> {
        let mut ids = Vec::new();
        for token in &self.tokens {
            if !ids.contains(&token.chain_id) {
                ids.push(token.chain_id);
            }
        }
        ids
    }
}

/// Errors that abort a discovery pass
#[derive(Debug, Error)]
pub enum WarpError {
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Decimals mismatch for {symbol} on chain {chain_id}: configured {configured}, on-chain {on_chain}")]
    DecimalsMismatch {
        chain_id: ChainId,
        symbol: String,
        configured: u8,
        on_chain: u8,
    },

    #[error("Symbol mismatch on chain {chain_id}: configured {configured}, on-chain {on_chain}")]
    SymbolMismatch {
        chain_id: ChainId,
        configured: String,
        on_chain: String,
    },

    #[error("Wrapped token mismatch for {symbol} on chain {chain_id}: configured {configured}, on-chain {on_chain}")]
    WrappedTokenMismatch {
        chain_id: ChainId,
        symbol: String,
        configured: Address,
        on_chain: Address,
    },

    #[error("{symbol} on chain {chain_id} lists remote chain {remote_chain_id} more than once")]
    DuplicateRemoteChain {
        chain_id: ChainId,
        symbol: String,
        remote_chain_id: ChainId,
    },

    #[error("{symbol} on chain {chain_id} lists its own chain as a remote")]
    SelfRemoteLink { chain_id: ChainId, symbol: String },

    #[error("{symbol} on chain {chain_id}: router for chain {remote_chain_id} is not an EVM address ({word})")]
    InvalidRouterAddress {
        chain_id: ChainId,
        symbol: String,
        remote_chain_id: ChainId,
        word: B256,
    },

    #[error("Discovery pass {generation} superseded by a newer pass")]
    Superseded { generation: u64 },
}

impl WarpError {
    /// Configuration disagrees with on-chain state
    pub fn is_config_mismatch(&self) -> bool {
        matches!(
            self,
            Self::DecimalsMismatch { .. }
                | Self::SymbolMismatch { .. }
                | Self::WrappedTokenMismatch { .. }
        )
    }

    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Chain(e) => e.error_code(),
            Self::DecimalsMismatch { .. } => "decimals_mismatch",
            Self::SymbolMismatch { .. } => "symbol_mismatch",
            Self::WrappedTokenMismatch { .. } => "wrapped_token_mismatch",
            Self::DuplicateRemoteChain { .. } => "duplicate_remote_chain",
            Self::SelfRemoteLink { .. } => "self_remote_link",
            Self::InvalidRouterAddress { .. } => "invalid_router_address",
            Self::Superseded { .. } => "superseded",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Chain(e) => e.status_code(),
            Self::Superseded { .. } => 409,
            _ => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_prepopulation() {
        let universe: BTreeSet<ChainId> = [1, 2, 3].into_iter().collect();
        let map = RouteMap::with_universe(&universe);
        assert_eq!(map.chain_count(), 3);
        assert_eq!(map.pairs().count(), 6);
        assert!(map.get(1, 1).is_none());
        assert!(map.get(1, 3).unwrap().is_empty());
        assert!(map.get(1, 4).is_none());
    }

    #[test]
    #[should_panic(expected = "outside the chain universe")]
    fn test_push_outside_universe_panics() {
        let universe: BTreeSet<ChainId> = [1, 2].into_iter().collect();
        let mut map = RouteMap::with_universe(&universe);
        let route = Route {
            route_type: RouteType::NativeToRemote,
            native_chain_id: 1,
            native_token_address: Address::ZERO,
            hyp_collateral_address: Address::ZERO,
            source_token_address: Address::ZERO,
            dest_token_address: Address::ZERO,
            decimals: 6,
        };
        map.push(1, 1, route);
    }

    #[test]
    fn test_route_serialization() {
        let route = Route {
            route_type: RouteType::RemoteToRemote,
            native_chain_id: 1,
            native_token_address: Address::repeat_byte(0x01),
            hyp_collateral_address: Address::repeat_byte(0x02),
            source_token_address: Address::repeat_byte(0x03),
            dest_token_address: Address::repeat_byte(0x04),
            decimals: 6,
        };
        let json = serde_json::to_value(route).unwrap();
        assert_eq!(json["type"], "RemoteToRemote");
        assert_eq!(json["nativeChainId"], 1);
        assert_eq!(json["decimals"], 6);
        let back: Route = serde_json::from_value(json).unwrap();
        assert_eq!(back, route);
    }

    #[test]
    fn test_snapshot_stats_count_linkless_anchors() {
        use warp_core::RemoteLink;

        let token = |chain_id: ChainId, tag: u8, remotes: &[ChainId]| EnrichedToken {
            chain_id,
            symbol: format!("TOK{}", tag),
            decimals: 6,
            hyp_collateral_address: Address::repeat_byte(tag),
            native_token_address: Address::repeat_byte(tag + 1),
            hyp_tokens: remotes
                .iter()
                .map(|&r| RemoteLink::new(r, Address::repeat_byte(0xf0)))
                .collect(),
        };
        let tokens = vec![token(7, 0x0c, &[]), token(1, 0x0a, &[2, 3])];
        let routes = crate::router::build_route_map(&tokens);
        let snapshot = RouteSnapshot::new(1, tokens, routes);

        let stats = snapshot.stats();
        assert_eq!(stats.chains, 4);
        assert_eq!(stats.tokens, 2);
        assert_eq!(stats.remote_links, 2);
        assert_eq!(stats.native_to_remote, 2);
        assert_eq!(stats.remote_to_remote, 2);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["remoteLinks"], 2);
        assert_eq!(json["nativeToRemote"], 2);
    }

    #[test]
    fn test_error_codes() {
        let err = WarpError::DecimalsMismatch {
            chain_id: 1,
            symbol: "USDC".into(),
            configured: 6,
            on_chain: 18,
        };
        assert!(err.is_config_mismatch());
        assert_eq!(err.error_code(), "decimals_mismatch");
        assert_eq!(err.status_code(), 422);
        assert_eq!(
            err.to_string(),
            "Decimals mismatch for USDC on chain 1: configured 6, on-chain 18"
        );

        let err = WarpError::Superseded { generation: 3 };
        assert!(!err.is_config_mismatch());
        assert_eq!(err.status_code(), 409);

        let err: WarpError = ChainError::Timeout {
            chain_id: 1,
            call: "domains",
            secs: 30,
        }
        .into();
        assert_eq!(err.error_code(), "rpc_timeout");
        assert_eq!(err.status_code(), 504);
    }
}
