use crate::entities::{prelude::*, source};
use crate::models::NormalizedSource;
use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

/// Repository for the canonical `sources` table.
///
/// This is the only writer of source rows; the resolver and the sweeper both
/// go through it. Upserts key on the identity tuple
/// `(catalog_item_id, episode_number, provider, quality)`.
pub struct SourceRepository {
    conn: DatabaseConnection,
}

impl SourceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_for_episode(
        &self,
        catalog_item_id: i32,
        episode: i32,
        active_only: bool,
    ) -> Result<Vec<source::Model>> {
        let mut query = Source::find()
            .filter(source::Column::CatalogItemId.eq(catalog_item_id))
            .filter(source::Column::EpisodeNumber.eq(episode));

        if active_only {
            query = query.filter(source::Column::IsActive.eq(true));
        }

        let rows = query
            .order_by_asc(source::Column::Priority)
            .order_by_asc(source::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Insert-or-merge one normalized candidate.
    ///
    /// On conflict with an existing identity tuple the mutable fields are
    /// merged and `last_checked` is stamped; `created_at` is left alone.
    pub async fn upsert(&self, catalog_item_id: i32, src: &NormalizedSource) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = source::ActiveModel {
            catalog_item_id: Set(catalog_item_id),
            episode_number: Set(src.episode),
            provider: Set(src.provider.clone()),
            quality: Set(src.quality.to_string()),
            source_url: Set(src.source_url.clone()),
            title: Set(src.title.clone()),
            priority: Set(src.priority),
            is_active: Set(src.active),
            last_checked: Set(Some(now.clone())),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        Source::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    source::Column::CatalogItemId,
                    source::Column::EpisodeNumber,
                    source::Column::Provider,
                    source::Column::Quality,
                ])
                .update_columns([
                    source::Column::SourceUrl,
                    source::Column::Title,
                    source::Column::Priority,
                    source::Column::IsActive,
                    source::Column::LastChecked,
                    source::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Deactivate active rows for one episode whose last sighting predates
    /// `threshold`. Rows never checked fall back to their creation time.
    pub async fn deactivate_stale_for_episode(
        &self,
        catalog_item_id: i32,
        episode: i32,
        threshold: &str,
    ) -> Result<u64> {
        let result = Source::update_many()
            .col_expr(source::Column::IsActive, Expr::value(false))
            .col_expr(
                source::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(source::Column::CatalogItemId.eq(catalog_item_id))
            .filter(source::Column::EpisodeNumber.eq(episode))
            .filter(source::Column::IsActive.eq(true))
            .filter(Self::older_than(threshold))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Table-wide variant used by the maintenance sweeper.
    pub async fn deactivate_older_than(&self, threshold: &str) -> Result<u64> {
        let result = Source::update_many()
            .col_expr(source::Column::IsActive, Expr::value(false))
            .col_expr(
                source::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(source::Column::IsActive.eq(true))
            .filter(Self::older_than(threshold))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Hard-delete rows that have been inactive since before `threshold`.
    /// Normal operation never deletes; only the maintenance sweep calls this.
    pub async fn purge_inactive_before(&self, threshold: &str) -> Result<u64> {
        let result = Source::delete_many()
            .filter(source::Column::IsActive.eq(false))
            .filter(source::Column::UpdatedAt.lt(threshold))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Record a probe verdict on one row.
    pub async fn mark_probed(&self, id: i32, available: bool) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        Source::update_many()
            .col_expr(source::Column::IsActive, Expr::value(available))
            .col_expr(source::Column::LastChecked, Expr::value(Some(now.clone())))
            .col_expr(source::Column::UpdatedAt, Expr::value(now))
            .filter(source::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn count_all(&self) -> Result<u64> {
        let count = Source::find().count(&self.conn).await?;
        Ok(count)
    }

    pub async fn count_active(&self) -> Result<u64> {
        let count = Source::find()
            .filter(source::Column::IsActive.eq(true))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    fn older_than(threshold: &str) -> Condition {
        Condition::any()
            .add(source::Column::LastChecked.lt(threshold))
            .add(
                Condition::all()
                    .add(source::Column::LastChecked.is_null())
                    .add(source::Column::CreatedAt.lt(threshold)),
            )
    }
}
