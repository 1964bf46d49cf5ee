use crate::entities::{catalog_item, prelude::*};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<catalog_item::Model>> {
        let item = CatalogItem::find_by_id(id).one(&self.conn).await?;
        Ok(item)
    }

    pub async fn list(&self) -> Result<Vec<catalog_item::Model>> {
        let items = CatalogItem::find()
            .order_by_asc(catalog_item::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(items)
    }

    pub async fn insert(
        &self,
        title: &str,
        year: Option<i32>,
        tmdb_id: Option<i32>,
        tvmaze_id: Option<i32>,
        episode_count: Option<i32>,
    ) -> Result<catalog_item::Model> {
        let active_model = catalog_item::ActiveModel {
            title: Set(title.to_string()),
            year: Set(year),
            tmdb_id: Set(tmdb_id),
            tvmaze_id: Set(tvmaze_id),
            episode_count: Set(episode_count),
            added_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active_model.insert(&self.conn).await?;
        Ok(model)
    }
}
