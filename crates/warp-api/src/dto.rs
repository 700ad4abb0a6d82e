//! Data Transfer Objects for API requests and responses

use axum::http::StatusCode;
use axum::Json;
use evm_chain_client::ChainStatus;
use serde::{Deserialize, Serialize};
use warp_core::{ChainId, EnrichedToken};
use warp_route::{Route, RouteSnapshot, RouteStats, WarpError};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A chain in the route universe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDto {
    pub chain_id: ChainId,
    /// Configured name, if the chain has an RPC entry
    pub name: Option<String>,
    /// Hosts a collateral anchor
    pub is_anchor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainsResponse {
    pub chains: Vec<ChainDto>,
    pub count: usize,
}

/// Probe result for one configured chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatusDto {
    pub name: String,
    #[serde(flatten)]
    pub status: ChainStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatusResponse {
    pub chains: Vec<ChainStatusDto>,
    pub online: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub generation: u64,
    pub tokens: Vec<EnrichedToken>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesResponse {
    pub source_chain_id: ChainId,
    pub dest_chain_id: ChainId,
    pub routes: Vec<Route>,
    pub count: usize,
}

/// Route map summary for a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatsResponse {
    pub generation: u64,
    pub built_at: u64,
    #[serde(flatten)]
    pub stats: RouteStats,
}

impl RouteStatsResponse {
    pub fn from_snapshot(snapshot: &RouteSnapshot) -> Self {
        Self {
            generation: snapshot.generation,
            built_at: snapshot.built_at,
            stats: snapshot.stats(),
        }
    }
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }
}

/// Map a discovery error to its HTTP status and body
pub fn warp_error_response(err: &WarpError) -> (StatusCode, Json<ApiError>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::new(err.error_code(), err.to_string())))
}
