//! Chain listing and endpoint status

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use futures::future::join_all;
use warp_route::ordered_chains;

use crate::dto::{ApiError, ChainDto, ChainStatusDto, ChainStatusResponse, ChainsResponse};
use crate::AppState;

/// Create chain routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_chains))
        .route("/status", get(get_chain_status))
}

/// GET /chains - Chains in the current route map, anchors first
async fn get_chains(
    State(state): State<AppState>,
) -> Result<Json<ChainsResponse>, (StatusCode, Json<ApiError>)> {
    let snapshot = state.require_snapshot().await?;
    let anchors = snapshot.anchor_chain_ids();

    let chains: Vec<ChainDto> = ordered_chains(&snapshot.routes, &anchors)
        .into_iter()
        .map(|chain_id| ChainDto {
            chain_id,
            name: state.config().chain(chain_id).map(|c| c.name.clone()),
            is_anchor: anchors.contains(&chain_id),
        })
        .collect();
    let count = chains.len();

    Ok(Json(ChainsResponse { chains, count }))
}

/// GET /chains/status - Probe every configured RPC endpoint
async fn get_chain_status(State(state): State<AppState>) -> Json<ChainStatusResponse> {
    let reader = state.index().reader();
    let probes = state.config().chains.iter().map(|chain| async move {
        ChainStatusDto {
            name: chain.name.clone(),
            status: reader.chain_status(chain.chain_id).await,
        }
    });

    let chains = join_all(probes).await;
    let online = chains.iter().filter(|c| c.status.is_online).count();

    Json(ChainStatusResponse { chains, online })
}
