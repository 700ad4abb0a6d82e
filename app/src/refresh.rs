//! Periodic route refresh
//!
//! Re-runs discovery on a fixed interval. A tick that fires while the
//! previous pass is still running aborts it; the newer pass wins.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use warp_route::RouteIndex;

/// Spawn the refresh loop. The first refresh fires one `period` from now.
pub fn spawn_refresh_loop(index: Arc<RouteIndex>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut clock = interval_at(Instant::now() + period, period);
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            clock.tick().await;
            tracing::debug!(period_secs = period.as_secs(), "scheduled route refresh");
            index.spawn_refresh();
        }
    })
}
