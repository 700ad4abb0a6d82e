//! Warp Route Discovery
//!
//! This crate discovers every transfer path through collateral-backed bridge
//! tokens: it reads each anchor's bridge state, validates it against
//! configuration, and builds the route graph that queries run against.

pub mod fetch;
pub mod index;
pub mod router;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use fetch::{discover_routes, fetch_all, fetch_remote_links};
pub use index::RouteIndex;
pub use router::{
    build_route_map, chain_universe, has_route, ordered_chains, route_for, route_stats,
    routes_between,
};
pub use state::{Route, RouteMap, RouteSnapshot, RouteStats, RouteType, WarpError};
