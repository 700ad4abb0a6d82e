//! Route Graph: Construction & Queries
//!
//! Derives every transfer path reachable through the configured collateral
//! anchors and answers lookups against the resulting map. Nothing in this
//! module performs I/O.

use std::collections::{BTreeSet, HashSet};

use warp_core::{parse_address, ChainId, EnrichedToken};

use crate::state::{Route, RouteMap, RouteStats, RouteType};

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Every chain id appearing as an anchor or as a remote link
pub fn chain_universe(tokens: &[EnrichedToken]) -> BTreeSet<ChainId> {
    let mut universe = BTreeSet::new();
    for token in tokens {
        universe.insert(token.chain_id);
        universe.extend(token.remote_chain_ids());
    }
    universe
}

/// Build the complete route map for a set of enriched tokens.
///
/// Every ordered pair of distinct chains in the universe gets an entry before
/// any edge is inserted. For each token, each remote link `R` produces a
/// `NativeToRemote` edge into `R`, a `RemoteToNative` edge out of `R`, and one
/// `RemoteToRemote` edge from `R` to every other remote link of the same
/// token. Order within an entry follows token order, then link order.
///
/// # Panics
/// If a token lists the same remote chain twice or lists its own chain as a
/// remote. The fetcher rejects both before the builder runs.
pub fn build_route_map(tokens: &[EnrichedToken]) -> RouteMap {
    let universe = chain_universe(tokens);
    let mut map = RouteMap::with_universe(&universe);

    for token in tokens {
        assert_well_formed(token);
        let native = token.chain_id;
        let collateral = token.hyp_collateral_address;

        for link in &token.hyp_tokens {
            map.push(
                native,
                link.chain_id,
                Route::from_token(RouteType::NativeToRemote, token, collateral, link.address),
            );
            map.push(
                link.chain_id,
                native,
                Route::from_token(RouteType::RemoteToNative, token, link.address, collateral),
            );

            // The mirror edge is added when `other` takes the outer position
            for other in token.hyp_tokens.iter().filter(|o| o.chain_id != link.chain_id) {
                map.push(
                    link.chain_id,
                    other.chain_id,
                    Route::from_token(
                        RouteType::RemoteToRemote,
                        token,
                        link.address,
                        other.address,
                    ),
                );
            }
        }
    }

    map
}

fn assert_well_formed(token: &EnrichedToken) {
    let mut seen = HashSet::with_capacity(token.hyp_tokens.len());
    for remote in token.remote_chain_ids() {
        assert!(
            remote != token.chain_id,
            "{} on chain {} lists its own chain as a remote",
            token.symbol,
            token.chain_id
        );
        assert!(
            seen.insert(remote),
            "{} on chain {} lists remote chain {} more than once",
            token.symbol,
            token.chain_id,
            remote
        );
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Routes from `src` to `dst`. Empty when either chain is unknown.
pub fn routes_between(src: ChainId, dst: ChainId, map: &RouteMap) -> &[Route] {
    map.get(src, dst).map(Vec::as_slice).unwrap_or(&[])
}

/// First route from `src` to `dst` anchored on `native_token_address`.
///
/// Address comparison ignores case. A malformed address yields `None`.
pub fn route_for<'a>(
    src: ChainId,
    dst: ChainId,
    native_token_address: &str,
    map: &'a RouteMap,
) -> Option<&'a Route> {
    let wanted = parse_address(native_token_address)?;
    routes_between(src, dst, map)
        .iter()
        .find(|route| route.native_token_address == wanted)
}

pub fn has_route(src: ChainId, dst: ChainId, native_token_address: &str, map: &RouteMap) -> bool {
    route_for(src, dst, native_token_address, map).is_some()
}

/// Chains in the map, anchors first, ascending within each group.
pub fn ordered_chains(map: &RouteMap, anchor_chain_ids: &[ChainId]) -> Vec<ChainId> {
    let mut chains: Vec<ChainId> = map.chain_ids().collect();
    chains.sort_by_key(|id| (!anchor_chain_ids.contains(id), *id));
    chains
}

/// Count chains, anchors, and routes by type.
///
/// Only the map is consulted, so `tokens` counts anchors with at least one
/// route. Each remote link yields exactly one `NativeToRemote` route.
pub fn route_stats(map: &RouteMap) -> RouteStats {
    let mut stats = RouteStats {
        chains: map.chain_count(),
        ..RouteStats::default()
    };

    let mut anchors = HashSet::new();
    for route in map.routes() {
        anchors.insert((route.native_chain_id, route.hyp_collateral_address));
        match route.route_type {
            RouteType::NativeToRemote => stats.native_to_remote += 1,
            RouteType::RemoteToNative => stats.remote_to_native += 1,
            RouteType::RemoteToRemote => stats.remote_to_remote += 1,
        }
    }
    stats.tokens = anchors.len();
    stats.remote_links = stats.native_to_remote;

    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
