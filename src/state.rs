use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::Store;
use crate::providers::ProviderRegistry;
use crate::services::{AvailabilityProber, ResolverService, Sweeper};

/// Build a shared HTTP client with reasonable defaults for provider fetches
/// and liveness probes. Reusing one client keeps connection pooling working
/// across every provider.
fn build_shared_http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.providers.request_timeout_seconds))
        .user_agent(config.providers.user_agent.clone())
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Everything a request handler needs, constructed once at startup. There
/// are no module-level singletons; handlers receive this by `Arc`.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub registry: Arc<ProviderRegistry>,

    pub resolver: Arc<ResolverService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(&config)?;

        let registry = Arc::new(ProviderRegistry::new(http_client.clone()));

        let prober = AvailabilityProber::new(
            http_client,
            Duration::from_secs(config.resolver.probe_timeout_seconds),
        );

        let resolver = Arc::new(ResolverService::new(
            store.clone(),
            registry.clone(),
            prober,
            &config.resolver,
        ));

        Ok(Self {
            config,
            store,
            registry,
            resolver,
        })
    }

    #[must_use]
    pub fn sweeper(&self) -> Sweeper {
        Sweeper::new(self.store.clone(), &self.config.resolver)
    }
}
