//! Core type definitions for warp route discovery

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bridge domain identifier (`uint32` on-chain)
pub type ChainId = u32;

/// A collateral anchor as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollateralToken {
    /// Chain the collateral contract lives on
    pub chain_id: ChainId,
    /// Expected ERC-20 symbol of the wrapped asset
    pub symbol: String,
    /// Expected ERC-20 decimals of the wrapped asset
    pub decimals: u8,
    /// Bridge collateral contract address
    #[serde(alias = "collateralContractAddress")]
    pub hyp_collateral_address: Address,
    /// Expected wrapped asset address (optional, verified against `wrappedToken()`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_token_address: Option<Address>,
}

impl fmt::Display for CollateralToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} ({})",
            self.symbol, self.chain_id, self.hyp_collateral_address
        )
    }
}

/// A remote chain and the token contract representing the collateral there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLink {
    pub chain_id: ChainId,
    pub address: Address,
}

impl RemoteLink {
    pub fn new(chain_id: ChainId, address: Address) -> Self {
        Self { chain_id, address }
    }
}

/// A collateral token enriched with the on-chain state the fetcher resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedToken {
    pub chain_id: ChainId,
    pub symbol: String,
    pub decimals: u8,
    pub hyp_collateral_address: Address,
    /// Wrapped asset address as returned by `wrappedToken()`
    pub native_token_address: Address,
    /// Connected remote tokens, in on-chain enumeration order
    pub hyp_tokens: Vec<RemoteLink>,
}

impl EnrichedToken {
    pub fn new(
        token: &CollateralToken,
        native_token_address: Address,
        hyp_tokens: Vec<RemoteLink>,
    ) -> Self {
        Self {
            chain_id: token.chain_id,
            symbol: token.symbol.clone(),
            decimals: token.decimals,
            hyp_collateral_address: token.hyp_collateral_address,
            native_token_address,
            hyp_tokens,
        }
    }

    /// Chain ids of every remote link, in enumeration order
    pub fn remote_chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.hyp_tokens.iter().map(|link| link.chain_id)
    }
}

// =============================================================================
// Address codec
// =============================================================================

/// Convert a router's raw `bytes32` into an EVM address.
///
/// Returns `None` when the upper 12 bytes are not zero, i.e. the word does not
/// encode a 20-byte address.
pub fn router_word_to_address(word: B256) -> Option<Address> {
    if word[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(Address::from_word(word))
}

/// Parse a `0x`-prefixed, 40 hex digit address. Case is ignored, so mixed-case
/// input with a wrong checksum still parses.
pub fn parse_address(input: &str) -> Option<Address> {
    let input = input.trim();
    let hex = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    hex.to_ascii_lowercase().parse().ok()
}

/// Case-insensitive address comparison. Malformed input never compares equal.
pub fn addresses_eq(a: &str, b: &str) -> bool {
    match (parse_address(a), parse_address(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
