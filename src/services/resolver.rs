use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::constants;
use crate::db::Store;
use crate::entities::source;
use crate::models::{
    NormalizedSource, ResolutionOutcome, ResolutionRequest, ResolvedSource, SourceStatus,
};
use crate::providers::ProviderRegistry;
use crate::quality::Quality;
use crate::services::fetch::FetchOrchestrator;
use crate::services::probe::AvailabilityProber;
use crate::services::{normalize, rank};

/// Domain errors for source resolution.
///
/// Only `ItemNotFound` and `Validation` abort a request; provider, probe,
/// and per-candidate persistence failures all degrade into the outcome.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Catalog item {0} not found")]
    ItemNotFound(i32),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ResolveError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// The source-resolution engine: fetch fan-out, normalization, ranking,
/// reconciliation, optional liveness verification, and the result cache.
pub struct ResolverService {
    store: Store,
    orchestrator: FetchOrchestrator,
    prober: AvailabilityProber,
    staleness_window: chrono::Duration,
    cache_ttl_minutes: i64,
}

impl ResolverService {
    #[must_use]
    pub fn new(
        store: Store,
        registry: Arc<ProviderRegistry>,
        prober: AvailabilityProber,
        config: &ResolverConfig,
    ) -> Self {
        let orchestrator = FetchOrchestrator::new(
            registry,
            Duration::from_millis(config.retry_base_delay_ms),
        );

        Self {
            store,
            orchestrator,
            prober,
            staleness_window: chrono::Duration::days(config.staleness_window_days),
            cache_ttl_minutes: config.cache_ttl_minutes,
        }
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.orchestrator.registry().names()
    }

    /// Resolves playable sources for one episode.
    ///
    /// # Errors
    /// - [`ResolveError::Validation`] for a non-positive episode or an
    ///   out-of-range result limit
    /// - [`ResolveError::ItemNotFound`] when the catalog item does not exist
    /// - [`ResolveError::Database`] on store failures outside the
    ///   per-candidate write path
    pub async fn resolve(
        &self,
        request: ResolutionRequest,
    ) -> Result<ResolutionOutcome, ResolveError> {
        Self::validate(&request)?;

        let item = self
            .store
            .get_catalog_item(request.catalog_item_id)
            .await?
            .ok_or(ResolveError::ItemNotFound(request.catalog_item_id))?;

        let key = request.cache_key();
        if !request.bypass_cache {
            match self.store.get_cached_resolution(&key).await {
                Ok(Some(mut cached)) => {
                    debug!("Resolution cache hit for {}", key);
                    cached.cached = true;
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(err) => warn!("Resolution cache read failed for {}: {}", key, err),
            }
        }

        info!(
            "Resolving sources for '{}' episode {}",
            item.title, request.episode
        );

        let fetched = self
            .orchestrator
            .fetch_all(&item, request.providers.as_deref())
            .await;

        let normalized = normalize::normalize_all(&fetched.candidates);
        debug!(
            "{} of {} candidates survived normalization",
            normalized.len(),
            fetched.candidates.len()
        );

        self.reconcile(item.id, request.episode, normalized).await;

        let mut views = self.load_views(&request).await?;

        if request.verify {
            self.verify_liveness(&mut views).await;
        }

        let outcome = ResolutionOutcome {
            episode: request.episode,
            sources: views,
            errors: fetched.failures,
            cached: false,
        };

        if let Err(err) = self
            .store
            .cache_resolution(&key, &outcome, self.cache_ttl_minutes)
            .await
        {
            warn!("Failed to cache resolution for {}: {}", key, err);
        }

        Ok(outcome)
    }

    fn validate(request: &ResolutionRequest) -> Result<(), ResolveError> {
        if request.episode < 1 {
            return Err(ResolveError::Validation(format!(
                "Invalid episode number: {}. Episode must be a positive integer",
                request.episode
            )));
        }

        let max = constants::resolver::MAX_RESULT_LIMIT;
        if request.limit < 1 || request.limit > max {
            return Err(ResolveError::Validation(format!(
                "Invalid limit: {}. Limit must be between 1 and {}",
                request.limit, max
            )));
        }

        Ok(())
    }

    /// Persists the normalized batch, grouped per episode. Stale rows for a
    /// group are deactivated before its new candidates land, and a single
    /// failed write is logged and skipped rather than failing the batch.
    async fn reconcile(&self, item_id: i32, requested_episode: i32, batch: Vec<NormalizedSource>) {
        let mut groups: std::collections::BTreeMap<i32, Vec<NormalizedSource>> =
            std::collections::BTreeMap::new();
        for src in batch {
            groups.entry(src.episode).or_default().push(src);
        }

        // The requested episode is reconciled even when no provider mentioned
        // it, so its dead rows still age out.
        let mut episodes: BTreeSet<i32> = groups.keys().copied().collect();
        episodes.insert(requested_episode);

        let threshold = (chrono::Utc::now() - self.staleness_window).to_rfc3339();

        for episode in episodes {
            match self
                .store
                .deactivate_stale_for_episode(item_id, episode, &threshold)
                .await
            {
                Ok(0) => {}
                Ok(n) => info!(
                    "Deactivated {} stale sources for item {} episode {}",
                    n, item_id, episode
                ),
                Err(err) => warn!(
                    "Staleness pass failed for item {} episode {}: {}",
                    item_id, episode, err
                ),
            }

            let Some(mut group) = groups.remove(&episode) else {
                continue;
            };
            rank::rank(&mut group);

            for src in &group {
                if let Err(err) = self.store.upsert_source(item_id, src).await {
                    warn!(
                        "Failed to persist {} source for item {} episode {}: {}",
                        src.provider, item_id, episode, err
                    );
                }
            }
        }
    }

    /// Loads the episode's active rows, applies the quality filter and the
    /// limit, and orders them the same way the ranker ordered the writes.
    async fn load_views(
        &self,
        request: &ResolutionRequest,
    ) -> Result<Vec<ResolvedSource>, ResolveError> {
        let rows = self
            .store
            .sources_for_episode(request.catalog_item_id, request.episode, true)
            .await?;

        let mut views: Vec<ResolvedSource> = rows.into_iter().map(Self::view_of).collect();

        if let Some(quality) = request.quality {
            views.retain(|v| v.quality == quality);
        }

        views.sort_by(|a, b| rank::compare(a.priority, a.quality, b.priority, b.quality));
        views.truncate(request.limit);

        Ok(views)
    }

    fn view_of(row: source::Model) -> ResolvedSource {
        ResolvedSource {
            id: row.id,
            episode: row.episode_number,
            source_url: row.source_url,
            // Stored labels are canonical; anything else coerces to the default.
            quality: Quality::parse(&row.quality).unwrap_or_else(|| Quality::coerce(&row.quality)),
            title: row.title,
            provider: row.provider,
            priority: row.priority,
            status: SourceStatus::Available,
            last_checked: row.last_checked,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    /// Probes every view concurrently and records the verdicts. If anything
    /// is reachable the dead entries are filtered out; if nothing is, the
    /// full unavailable-marked set is kept rather than collapsing to empty.
    async fn verify_liveness(&self, views: &mut Vec<ResolvedSource>) {
        if views.is_empty() {
            return;
        }

        let targets: Vec<(i32, String)> = views
            .iter()
            .map(|v| (v.id, v.source_url.clone()))
            .collect();

        let verdicts = self.prober.probe_all(&targets).await;
        let now = chrono::Utc::now().to_rfc3339();

        for view in views.iter_mut() {
            let available = verdicts.get(&view.id).copied().unwrap_or(false);
            view.status = if available {
                SourceStatus::Available
            } else {
                SourceStatus::Unavailable
            };
            view.last_checked = Some(now.clone());

            if let Err(err) = self.store.mark_source_probed(view.id, available).await {
                warn!("Failed to record probe result for source {}: {}", view.id, err);
            }
        }

        let alive = views
            .iter()
            .filter(|v| v.status == SourceStatus::Available)
            .count();

        if alive > 0 {
            views.retain(|v| v.status == SourceStatus::Available);
        } else {
            debug!("All {} probed sources are unavailable", views.len());
        }
    }
}
