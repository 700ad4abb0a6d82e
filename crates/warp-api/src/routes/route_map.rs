//! Route map queries and refresh

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use warp_core::ChainId;
use warp_route::{route_for, routes_between, Route};

use crate::dto::{
    warp_error_response, ApiError, RouteStatsResponse, RoutesResponse, TokensResponse,
};
use crate::AppState;

/// Create route map routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/refresh", post(refresh))
        .route("/:src/:dst", get(get_routes))
        .route("/:src/:dst/:token", get(get_route_for_token))
}

/// GET /tokens - Enriched anchors of the current snapshot
pub async fn get_tokens(
    State(state): State<AppState>,
) -> Result<Json<TokensResponse>, (StatusCode, Json<ApiError>)> {
    let snapshot = state.require_snapshot().await?;
    Ok(Json(TokensResponse {
        generation: snapshot.generation,
        tokens: snapshot.tokens.clone(),
        count: snapshot.tokens.len(),
    }))
}

/// GET /routes/stats - Route counts for the current snapshot
async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<RouteStatsResponse>, (StatusCode, Json<ApiError>)> {
    let snapshot = state.require_snapshot().await?;
    Ok(Json(RouteStatsResponse::from_snapshot(&snapshot)))
}

/// GET /routes/:src/:dst - All routes between two chains
async fn get_routes(
    State(state): State<AppState>,
    Path((src, dst)): Path<(ChainId, ChainId)>,
) -> Result<Json<RoutesResponse>, (StatusCode, Json<ApiError>)> {
    let snapshot = state.require_snapshot().await?;
    let routes = routes_between(src, dst, &snapshot.routes).to_vec();

    Ok(Json(RoutesResponse {
        source_chain_id: src,
        dest_chain_id: dst,
        count: routes.len(),
        routes,
    }))
}

/// GET /routes/:src/:dst/:token - Route for one collateral asset
async fn get_route_for_token(
    State(state): State<AppState>,
    Path((src, dst, token)): Path<(ChainId, ChainId, String)>,
) -> Result<Json<Route>, (StatusCode, Json<ApiError>)> {
    let snapshot = state.require_snapshot().await?;

    let route = route_for(src, dst, &token, &snapshot.routes).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!(
                "No route from {} to {} for {}",
                src, dst, token
            ))),
        )
    })?;

    Ok(Json(*route))
}

/// POST /routes/refresh - Run a discovery pass now
async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<RouteStatsResponse>, (StatusCode, Json<ApiError>)> {
    let snapshot = state.index().refresh().await.map_err(|e| {
        tracing::warn!(error = %e, "requested route refresh failed");
        warp_error_response(&e)
    })?;

    Ok(Json(RouteStatsResponse::from_snapshot(&snapshot)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::Address;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use warp_core::{AppConfig, ChainConfig};
    use warp_route::test_utils::{collateral_token, MockChainReader};
    use warp_route::RouteIndex;

    use crate::{create_app, AppState};

    const COLLATERAL: Address = Address::new([0x11; 20]);
    const USDC: Address = Address::new([0x12; 20]);

    fn make_config() -> AppConfig {
        AppConfig {
            chains: vec![ChainConfig {
                chain_id: 1,
                name: "ethereum".to_string(),
                rpc_url: "http://127.0.0.1:8545".to_string(),
            }],
            tokens: vec![collateral_token(1, "USDC", 6, COLLATERAL)],
            ..AppConfig::default()
        }
    }

    fn make_state(decimals: u8) -> AppState {
        let reader = Arc::new(
            MockChainReader::new()
                .with_collateral(
                    1,
                    COLLATERAL,
                    USDC,
                    &[(2, Address::new([0xa2; 20])), (3, Address::new([0xa3; 20]))],
                )
                .with_asset(1, USDC, decimals, "USDC"),
        );
        let config = make_config();
        let index = Arc::new(RouteIndex::new(reader, config.tokens.clone(), 1));
        AppState::new(config, index)
    }

    async fn send(state: &AppState, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = create_app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&make_state(6), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unavailable_before_first_refresh() {
        let state = make_state(6);
        for uri in ["/chains", "/tokens", "/routes/stats", "/routes/1/2"] {
            let (status, body) = send(&state, "GET", uri).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
            assert_eq!(body["code"], "routes_unavailable");
        }
    }

    #[tokio::test]
    async fn test_refresh_then_query() {
        let state = make_state(6);

        let (status, body) = send(&state, "POST", "/routes/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generation"], 1);
        assert_eq!(body["nativeToRemote"], 2);
        assert_eq!(body["remoteToRemote"], 2);
        assert_eq!(body["tokens"], 1);
        assert_eq!(body["remoteLinks"], 2);
        assert_eq!(body["chains"], 3);

        let (status, body) = send(&state, "GET", "/routes/2/3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["routes"][0]["type"], "RemoteToRemote");

        // Unknown chain is an empty result, not an error
        let (status, body) = send(&state, "GET", "/routes/2/999").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);

        let (status, body) = send(&state, "GET", "/chains").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
        assert_eq!(body["chains"][0]["chainId"], 1);
        assert_eq!(body["chains"][0]["isAnchor"], true);
        assert_eq!(body["chains"][0]["name"], "ethereum");
        assert_eq!(body["chains"][1]["name"], Value::Null);

        let (status, body) = send(&state, "GET", "/tokens").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["tokens"][0]["hypTokens"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_route_for_token() {
        let state = make_state(6);
        send(&state, "POST", "/routes/refresh").await;

        let upper = format!("0x{}", "12".repeat(20).to_uppercase());
        let (status, body) = send(&state, "GET", &format!("/routes/1/2/{}", upper)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "NativeToRemote");
        assert_eq!(body["decimals"], 6);

        let other = format!("0x{}", "99".repeat(20));
        let (status, body) = send(&state, "GET", &format!("/routes/1/2/{}", other)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");

        let (status, _) = send(&state, "GET", "/routes/1/2/not-an-address").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_refresh_config_mismatch() {
        let state = make_state(18);
        let (status, body) = send(&state, "POST", "/routes/refresh").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "decimals_mismatch");

        // Still nothing to serve
        let (status, _) = send(&state, "GET", "/routes/stats").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_chain_status() {
        let (status, body) = send(&make_state(6), "GET", "/chains/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["online"], 1);
        assert_eq!(body["chains"][0]["name"], "ethereum");
        assert_eq!(body["chains"][0]["isOnline"], true);
    }
}
