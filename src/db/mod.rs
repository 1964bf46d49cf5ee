use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{catalog_item, source};
use crate::models::{NormalizedSource, ResolutionOutcome};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn source_repo(&self) -> repositories::source::SourceRepository {
        repositories::source::SourceRepository::new(self.conn.clone())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Catalog items
    // ------------------------------------------------------------------

    pub async fn get_catalog_item(&self, id: i32) -> Result<Option<catalog_item::Model>> {
        self.catalog_repo().find_by_id(id).await
    }

    pub async fn list_catalog_items(&self) -> Result<Vec<catalog_item::Model>> {
        self.catalog_repo().list().await
    }

    pub async fn add_catalog_item(
        &self,
        title: &str,
        year: Option<i32>,
        tmdb_id: Option<i32>,
        tvmaze_id: Option<i32>,
        episode_count: Option<i32>,
    ) -> Result<catalog_item::Model> {
        self.catalog_repo()
            .insert(title, year, tmdb_id, tvmaze_id, episode_count)
            .await
    }

    // ------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------

    pub async fn sources_for_episode(
        &self,
        catalog_item_id: i32,
        episode: i32,
        active_only: bool,
    ) -> Result<Vec<source::Model>> {
        self.source_repo()
            .find_for_episode(catalog_item_id, episode, active_only)
            .await
    }

    pub async fn upsert_source(&self, catalog_item_id: i32, src: &NormalizedSource) -> Result<()> {
        self.source_repo().upsert(catalog_item_id, src).await
    }

    pub async fn deactivate_stale_for_episode(
        &self,
        catalog_item_id: i32,
        episode: i32,
        threshold: &str,
    ) -> Result<u64> {
        self.source_repo()
            .deactivate_stale_for_episode(catalog_item_id, episode, threshold)
            .await
    }

    pub async fn deactivate_sources_older_than(&self, threshold: &str) -> Result<u64> {
        self.source_repo().deactivate_older_than(threshold).await
    }

    pub async fn purge_inactive_sources(&self, threshold: &str) -> Result<u64> {
        self.source_repo().purge_inactive_before(threshold).await
    }

    pub async fn mark_source_probed(&self, id: i32, available: bool) -> Result<()> {
        self.source_repo().mark_probed(id, available).await
    }

    pub async fn count_sources(&self) -> Result<(u64, u64)> {
        let repo = self.source_repo();
        let total = repo.count_all().await?;
        let active = repo.count_active().await?;
        Ok((total, active))
    }

    // ------------------------------------------------------------------
    // Resolution cache
    // ------------------------------------------------------------------

    pub async fn get_cached_resolution(&self, key: &str) -> Result<Option<ResolutionOutcome>> {
        self.cache_repo().get(key).await
    }

    pub async fn cache_resolution(
        &self,
        key: &str,
        outcome: &ResolutionOutcome,
        ttl_minutes: i64,
    ) -> Result<()> {
        self.cache_repo().set(key, outcome, ttl_minutes).await
    }

    pub async fn invalidate_resolution(&self, key: &str) -> Result<()> {
        self.cache_repo().delete(key).await
    }

    pub async fn sweep_expired_cache(&self) -> Result<u64> {
        self.cache_repo().sweep_expired().await
    }
}
