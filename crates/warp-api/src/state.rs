//! Application state shared across API handlers

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use warp_core::AppConfig;
use warp_route::{RouteIndex, RouteSnapshot};

use crate::dto::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    index: Arc<RouteIndex>,
}

impl AppState {
    pub fn new(config: AppConfig, index: Arc<RouteIndex>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, index }),
        }
    }

    /// Loaded configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn index(&self) -> &Arc<RouteIndex> {
        &self.inner.index
    }

    /// Latest snapshot, or 503 if no discovery pass has completed yet
    pub async fn require_snapshot(&self) -> Result<Arc<RouteSnapshot>, (StatusCode, Json<ApiError>)> {
        self.inner.index.snapshot().await.ok_or_else(|| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::new(
                    "routes_unavailable",
                    "Route discovery has not completed yet",
                )),
            )
        })
    }
}
