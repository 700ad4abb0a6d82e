//! warp-api: HTTP API layer for warp route discovery
//!
//! Serves the latest discovered route map as read-only JSON and lets an
//! operator trigger a refresh.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::AppState;
