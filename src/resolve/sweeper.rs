//! Periodic eviction of expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::observability::metrics;
use crate::resolve::cache::ResolutionCache;

/// Background task that sweeps the resolution cache on a fixed interval.
pub struct Sweeper {
    cache: Arc<ResolutionCache>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(cache: Arc<ResolutionCache>, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// Sweep until `shutdown` fires (or its sender is dropped).
    ///
    /// Returns the total number of entries evicted.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> usize {
        tracing::info!(interval = ?self.interval, "Cache sweeper starting");

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut total = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    total += self.sweep_once();
                }
                _ = shutdown.recv() => {
                    tracing::info!(evicted_total = total, "Cache sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        total
    }

    fn sweep_once(&self) -> usize {
        let evicted = self.cache.evict_expired(Instant::now());
        if evicted > 0 {
            metrics::record_evictions(evicted);
            tracing::debug!(
                evicted,
                remaining = self.cache.len(),
                "Expired cache entries evicted"
            );
        }
        evicted
    }
}
