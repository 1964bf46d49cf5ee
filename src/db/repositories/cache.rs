use crate::entities::{prelude::*, resolution_cache};
use crate::models::ResolutionOutcome;
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Short-TTL memo of fully resolved responses, keyed by the request's
/// deterministic cache key. Expired rows are purged opportunistically on
/// read and by the background sweeper.
pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<ResolutionOutcome>> {
        let now = chrono::Utc::now().to_rfc3339();

        // Opportunistic cleanup; the sweeper handles the rest.
        let _ = ResolutionCache::delete_many()
            .filter(resolution_cache::Column::ExpiresAt.lt(&now))
            .exec(&self.conn)
            .await;

        let entry = ResolutionCache::find()
            .filter(resolution_cache::Column::CacheKey.eq(key))
            .filter(resolution_cache::Column::ExpiresAt.gt(&now))
            .one(&self.conn)
            .await?;

        if let Some(e) = entry {
            let outcome: ResolutionOutcome = serde_json::from_str(&e.payload_json)?;
            Ok(Some(outcome))
        } else {
            Ok(None)
        }
    }

    pub async fn set(&self, key: &str, outcome: &ResolutionOutcome, ttl_minutes: i64) -> Result<()> {
        let payload_json = serde_json::to_string(outcome)?;
        let now = chrono::Utc::now();
        let expires_at = (now + chrono::Duration::minutes(ttl_minutes)).to_rfc3339();

        let active_model = resolution_cache::ActiveModel {
            cache_key: Set(key.to_string()),
            payload_json: Set(payload_json),
            created_at: Set(now.to_rfc3339()),
            expires_at: Set(expires_at),
            ..Default::default()
        };

        ResolutionCache::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(resolution_cache::Column::CacheKey)
                    .update_columns([
                        resolution_cache::Column::PayloadJson,
                        resolution_cache::Column::CreatedAt,
                        resolution_cache::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        ResolutionCache::delete_many()
            .filter(resolution_cache::Column::CacheKey.eq(key))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn sweep_expired(&self) -> Result<u64> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = ResolutionCache::delete_many()
            .filter(resolution_cache::Column::ExpiresAt.lt(&now))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
