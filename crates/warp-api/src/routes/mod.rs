//! API route handlers

pub mod chains;
pub mod health;
pub mod route_map;

use axum::{routing::get, Router};

use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/tokens", get(route_map::get_tokens))
        .nest("/chains", chains::router())
        .nest("/routes", route_map::router())
        .with_state(state)
}
