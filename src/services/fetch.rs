use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::entities::catalog_item;
use crate::models::{AdapterFailure, RawCandidate};
use crate::providers::{Provider, ProviderRegistry};
use crate::services::retry::{RetryPolicy, retry_with_backoff};

/// Everything one fan-out produced: candidates from the providers that
/// succeeded, structured failures from the ones that didn't.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub candidates: Vec<RawCandidate>,
    pub failures: Vec<AdapterFailure>,
}

/// Runs the requested providers concurrently and joins on all of them.
///
/// One provider exhausting its retries never cancels its siblings; its
/// failure is collected next to whatever the others returned.
pub struct FetchOrchestrator {
    registry: Arc<ProviderRegistry>,
    base_delay: Duration,
}

impl FetchOrchestrator {
    #[must_use]
    pub const fn new(registry: Arc<ProviderRegistry>, base_delay: Duration) -> Self {
        Self {
            registry,
            base_delay,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Fans out over `subset` (or every registered provider when `None`).
    /// Unknown provider names are skipped with a warning, not an error.
    pub async fn fetch_all(
        &self,
        item: &catalog_item::Model,
        subset: Option<&[String]>,
    ) -> FetchOutcome {
        let providers: Vec<Arc<dyn Provider>> = match subset {
            None => self.registry.all().to_vec(),
            Some(names) => names
                .iter()
                .filter_map(|name| match self.registry.get(name) {
                    Some(provider) => Some(provider.clone()),
                    None => {
                        warn!("Unknown provider '{}' requested, skipping", name);
                        None
                    }
                })
                .collect(),
        };

        let tasks = providers.iter().map(|provider| {
            let provider = provider.clone();
            async move {
                let policy = RetryPolicy {
                    max_attempts: provider.max_retries(),
                    base_delay: self.base_delay,
                    ..RetryPolicy::default()
                };

                let result =
                    retry_with_backoff(policy, provider.name(), || provider.fetch(item)).await;
                (provider.name(), result)
            }
        });

        let settled = futures::future::join_all(tasks).await;

        let mut outcome = FetchOutcome::default();
        for (name, result) in settled {
            match result {
                Ok(candidates) => {
                    debug!("{} returned {} candidates", name, candidates.len());
                    outcome.candidates.extend(candidates);
                }
                Err(err) => {
                    warn!("Provider {} failed after retries: {}", name, err);
                    outcome.failures.push(AdapterFailure {
                        provider: name.to_string(),
                        message: err.to_string(),
                        timestamp: chrono::Utc::now().to_rfc3339(),
                    });
                }
            }
        }

        outcome
    }
}
