//! Remote Link Discovery
//!
//! Reads each collateral anchor's bridge state, checks it against
//! configuration, and resolves the token contract on every connected chain.

use std::collections::HashSet;

use futures::future::{try_join_all, BoxFuture};
use futures::stream::{self, StreamExt, TryStreamExt};
use warp_core::{router_word_to_address, CollateralToken, EnrichedToken, RemoteLink};

use evm_chain_client::ChainReader;

use crate::router::build_route_map;
use crate::state::{RouteMap, WarpError};

/// Fetch one anchor's remote links.
///
/// Fails on the first transport error or configuration mismatch; nothing is
/// retried here.
pub async fn fetch_remote_links(
    reader: &dyn ChainReader,
    token: &CollateralToken,
) -> Result<EnrichedToken, WarpError> {
    let chain_id = token.chain_id;
    let collateral = token.hyp_collateral_address;

    let wrapped = reader.wrapped_token(chain_id, collateral).await?;
    if let Some(configured) = token.native_token_address {
        if configured != wrapped {
            return Err(WarpError::WrappedTokenMismatch {
                chain_id,
                symbol: token.symbol.clone(),
                configured,
                on_chain: wrapped,
            });
        }
    }

    let decimals = reader.decimals(chain_id, wrapped).await?;
    let symbol = reader.symbol(chain_id, wrapped).await?;

    if decimals != token.decimals {
        return Err(WarpError::DecimalsMismatch {
            chain_id,
            symbol: token.symbol.clone(),
            configured: token.decimals,
            on_chain: decimals,
        });
    }
    if symbol != token.symbol {
        return Err(WarpError::SymbolMismatch {
            chain_id,
            configured: token.symbol.clone(),
            on_chain: symbol,
        });
    }

    let domains = reader.domains(chain_id, collateral).await?;

    let mut seen = HashSet::with_capacity(domains.len());
    for &domain in &domains {
        if domain == chain_id {
            return Err(WarpError::SelfRemoteLink {
                chain_id,
                symbol: token.symbol.clone(),
            });
        }
        if !seen.insert(domain) {
            return Err(WarpError::DuplicateRemoteChain {
                chain_id,
                symbol: token.symbol.clone(),
                remote_chain_id: domain,
            });
        }
    }

    let words = try_join_all(
        domains
            .iter()
            .map(|&domain| reader.router(chain_id, collateral, domain)),
    )
    .await?;

    let hyp_tokens = domains
        .iter()
        .zip(words)
        .map(|(&domain, word)| {
            router_word_to_address(word)
                .map(|address| RemoteLink::new(domain, address))
                .ok_or_else(|| WarpError::InvalidRouterAddress {
                    chain_id,
                    symbol: token.symbol.clone(),
                    remote_chain_id: domain,
                    word,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        chain_id,
        symbol = %token.symbol,
        remotes = hyp_tokens.len(),
        "fetched remote links"
    );

    Ok(EnrichedToken::new(token, wrapped, hyp_tokens))
}

/// Fetch every configured anchor, at most `max_concurrent` at a time.
///
/// Output order matches `tokens`. A value of 0 is treated as 1.
pub async fn fetch_all<'a>(
    reader: &'a dyn ChainReader,
    tokens: &'a [CollateralToken],
    max_concurrent: usize,
) -> Result<Vec<EnrichedToken>, WarpError> {
    // Boxed with a named lifetime so the pass stays `Send` under `tokio::spawn`
    let fetches = tokens
        .iter()
        .map(|token| -> BoxFuture<'a, Result<EnrichedToken, WarpError>> {
            Box::pin(async move {
                fetch_remote_links(reader, token).await.map_err(|e| {
                    tracing::warn!(token = %token, error = %e, "remote link discovery failed");
                    e
                })
            })
        })
        .collect::<Vec<_>>();

    stream::iter(fetches)
        .buffered(max_concurrent.max(1))
        .try_collect()
        .await
}

/// Run a full discovery pass: fetch every anchor, then build the route map.
pub async fn discover_routes(
    reader: &dyn ChainReader,
    tokens: &[CollateralToken],
    max_concurrent: usize,
) -> Result<(Vec<EnrichedToken>, RouteMap), WarpError> {
    let enriched = fetch_all(reader, tokens, max_concurrent).await?;
    let routes = build_route_map(&enriched);
    Ok((enriched, routes))
}
