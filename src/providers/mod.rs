use anyhow::Result;
use std::sync::Arc;

use crate::entities::catalog_item;
use crate::models::RawCandidate;

pub mod filemoon;
pub mod tvmaze;
pub mod vidlink;
pub mod vidsrc;

pub use filemoon::FilemoonProvider;
pub use tvmaze::TvmazeProvider;
pub use vidlink::VidlinkProvider;
pub use vidsrc::VidsrcProvider;

/// One upstream source of playable-episode candidates.
///
/// Implementations must be side-effect free towards shared state: a failed
/// fetch leaves nothing half-written, it just returns the error. Candidates
/// come back raw; the normalizer is the trust boundary.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Default ranking priority for candidates that don't carry their own.
    fn priority(&self) -> i32;

    /// Attempt budget the orchestrator grants this provider.
    fn max_retries(&self) -> u32;

    async fn fetch(&self, item: &catalog_item::Model) -> Result<Vec<RawCandidate>>;
}

/// Static priority table, keyed by provider name. The normalizer consults
/// this when a candidate omits its priority.
pub static DEFAULT_PRIORITIES: &[(&str, i32)] = &[
    (vidsrc::NAME, 1),
    (vidlink::NAME, 2),
    (filemoon::NAME, 3),
    (tvmaze::NAME, 5),
];

#[must_use]
pub fn default_priority(name: &str) -> Option<i32> {
    DEFAULT_PRIORITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, p)| *p)
}

/// Fixed table of known providers, built once at startup.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Builds the full production set on a shared HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            providers: vec![
                Arc::new(VidsrcProvider::with_shared_client(client.clone())),
                Arc::new(VidlinkProvider::with_shared_client(client.clone())),
                Arc::new(FilemoonProvider::with_shared_client(client.clone())),
                Arc::new(TvmazeProvider::with_shared_client(client)),
            ],
        }
    }

    /// Registry over an explicit provider set. Tests use this to swap in
    /// scripted providers.
    #[must_use]
    pub fn from_providers(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn all(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}
