use sea_orm::entity::prelude::*;

/// One playable source record.
///
/// Identity is `(catalog_item_id, episode_number, provider, quality)`; the
/// initial migration enforces uniqueness on that tuple. Timestamps are
/// RFC3339 strings.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub catalog_item_id: i32,
    pub episode_number: i32,
    pub provider: String,
    pub quality: String,
    pub source_url: String,
    pub title: String,
    pub priority: i32,
    pub is_active: bool,
    pub last_checked: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::catalog_item::Entity",
        from = "Column::CatalogItemId",
        to = "super::catalog_item::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CatalogItem,
}

impl Related<super::catalog_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CatalogItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
