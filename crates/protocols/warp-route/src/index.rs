//! Route Index
//!
//! Holds the latest completed route map and coordinates refreshes. Each
//! refresh takes a generation number; a refresh only publishes if nothing
//! newer has been published in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use evm_chain_client::ChainReader;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use warp_core::CollateralToken;

use crate::fetch::discover_routes;
use crate::state::{RouteSnapshot, WarpError};

/// Last-write-wins holder for discovery results
pub struct RouteIndex {
    reader: Arc<dyn ChainReader>,
    tokens: Vec<CollateralToken>,
    max_concurrent: usize,
    generation: AtomicU64,
    current: RwLock<Option<Arc<RouteSnapshot>>>,
    background: Mutex<Option<JoinHandle<()>>>,
}

impl RouteIndex {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        tokens: Vec<CollateralToken>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            reader,
            tokens,
            max_concurrent: max_concurrent.max(1),
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
            background: Mutex::new(None),
        }
    }

    pub fn reader(&self) -> &Arc<dyn ChainReader> {
        &self.reader
    }

    /// Latest published snapshot, if any pass has completed
    pub async fn snapshot(&self) -> Option<Arc<RouteSnapshot>> {
        self.current.read().await.clone()
    }

    /// Run one discovery pass and publish its result.
    ///
    /// Returns [`WarpError::Superseded`] when a newer pass published first.
    /// On any error the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<Arc<RouteSnapshot>, WarpError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, tokens = self.tokens.len(), "route discovery started");

        let (tokens, routes) =
            discover_routes(self.reader.as_ref(), &self.tokens, self.max_concurrent).await?;
        let snapshot = Arc::new(RouteSnapshot::new(generation, tokens, routes));

        let mut current = self.current.write().await;
        if let Some(existing) = current.as_ref() {
            if existing.generation > generation {
                tracing::debug!(
                    generation,
                    published = existing.generation,
                    "discarding superseded discovery pass"
                );
                return Err(WarpError::Superseded { generation });
            }
        }
        *current = Some(snapshot.clone());
        drop(current);

        tracing::info!(
            generation,
            chains = snapshot.routes.chain_count(),
            routes = snapshot.routes.routes().count(),
            "route map published"
        );

        Ok(snapshot)
    }

    /// Start a refresh in the background, aborting any background refresh
    /// still in flight.
    pub fn spawn_refresh(self: &Arc<Self>) {
        let index = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Err(e) = index.refresh().await {
                tracing::warn!(error = %e, "background route refresh failed");
            }
        });

        let previous = match self.background.lock() {
            Ok(mut slot) => slot.replace(handle),
            Err(poisoned) => poisoned.into_inner().replace(handle),
        };
        if let Some(previous) = previous {
            if !previous.is_finished() {
                tracing::debug!("aborting in-flight background refresh");
            }
            previous.abort();
        }
    }

    /// Whether a background refresh is still running
    pub fn refresh_in_progress(&self) -> bool {
        match self.background.lock() {
            Ok(slot) => slot.as_ref().is_some_and(|h| !h.is_finished()),
            Err(_) => false,
        }
    }
}
