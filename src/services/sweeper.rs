use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::db::Store;

/// Background maintenance: evicts expired cache entries, deactivates sources
/// nothing has re-sighted within the staleness window, and purges records
/// that have been inactive long enough to be noise.
#[derive(Clone)]
pub struct Sweeper {
    store: Store,
    staleness_window: chrono::Duration,
    purge_after: chrono::Duration,
    cache_interval: Duration,
    staleness_interval: Duration,
}

impl Sweeper {
    #[must_use]
    pub fn new(store: Store, config: &ResolverConfig) -> Self {
        Self {
            store,
            staleness_window: chrono::Duration::days(config.staleness_window_days),
            purge_after: chrono::Duration::days(config.purge_after_days),
            cache_interval: Duration::from_secs(config.cache_sweep_interval_seconds),
            staleness_interval: Duration::from_secs(config.staleness_sweep_interval_seconds),
        }
    }

    pub fn start(&self) {
        let sweeper = self.clone();
        tokio::spawn(async move {
            sweeper.cache_loop().await;
        });

        let sweeper = self.clone();
        tokio::spawn(async move {
            sweeper.staleness_loop().await;
        });
    }

    async fn cache_loop(&self) {
        let mut interval = tokio::time::interval(self.cache_interval);
        info!("Cache sweep loop started");

        loop {
            interval.tick().await;
            match self.store.sweep_expired_cache().await {
                Ok(0) => {}
                Ok(n) => debug!("Evicted {} expired resolution cache entries", n),
                Err(e) => warn!("Cache sweep failed: {}", e),
            }
        }
    }

    async fn staleness_loop(&self) {
        let mut interval = tokio::time::interval(self.staleness_interval);
        info!("Staleness sweep loop started");

        loop {
            interval.tick().await;

            let stale_threshold = (chrono::Utc::now() - self.staleness_window).to_rfc3339();
            match self
                .store
                .deactivate_sources_older_than(&stale_threshold)
                .await
            {
                Ok(0) => {}
                Ok(n) => info!("Deactivated {} stale sources", n),
                Err(e) => warn!("Staleness sweep failed: {}", e),
            }

            let purge_threshold = (chrono::Utc::now() - self.purge_after).to_rfc3339();
            match self.store.purge_inactive_sources(&purge_threshold).await {
                Ok(0) => {}
                Ok(n) => info!("Purged {} long-inactive sources", n),
                Err(e) => warn!("Inactive-source purge failed: {}", e),
            }
        }
    }
}
