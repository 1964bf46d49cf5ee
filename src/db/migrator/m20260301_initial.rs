use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CatalogItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CatalogItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CatalogItems::Title).string().not_null())
                    .col(ColumnDef::new(CatalogItems::Year).integer())
                    .col(ColumnDef::new(CatalogItems::TmdbId).integer())
                    .col(ColumnDef::new(CatalogItems::TvmazeId).integer())
                    .col(ColumnDef::new(CatalogItems::EpisodeCount).integer())
                    .col(ColumnDef::new(CatalogItems::AddedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sources::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sources::CatalogItemId).integer().not_null())
                    .col(ColumnDef::new(Sources::EpisodeNumber).integer().not_null())
                    .col(ColumnDef::new(Sources::Provider).string().not_null())
                    .col(ColumnDef::new(Sources::Quality).string().not_null())
                    .col(ColumnDef::new(Sources::SourceUrl).string().not_null())
                    .col(ColumnDef::new(Sources::Title).string().not_null())
                    .col(ColumnDef::new(Sources::Priority).integer().not_null())
                    .col(
                        ColumnDef::new(Sources::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Sources::LastChecked).string())
                    .col(ColumnDef::new(Sources::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Sources::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sources_catalog_item")
                            .from(Sources::Table, Sources::CatalogItemId)
                            .to(CatalogItems::Table, CatalogItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Identity tuple: at most one record per (item, episode, provider, quality).
        manager
            .create_index(
                Index::create()
                    .name("idx_sources_identity")
                    .table(Sources::Table)
                    .col(Sources::CatalogItemId)
                    .col(Sources::EpisodeNumber)
                    .col(Sources::Provider)
                    .col(Sources::Quality)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sources_episode")
                    .table(Sources::Table)
                    .col(Sources::CatalogItemId)
                    .col(Sources::EpisodeNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ResolutionCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResolutionCache::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResolutionCache::CacheKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ResolutionCache::PayloadJson)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResolutionCache::CreatedAt)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResolutionCache::ExpiresAt)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_resolution_cache_expires")
                    .table(ResolutionCache::Table)
                    .col(ResolutionCache::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResolutionCache::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CatalogItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CatalogItems {
    Table,
    Id,
    Title,
    Year,
    TmdbId,
    TvmazeId,
    EpisodeCount,
    AddedAt,
}

#[derive(DeriveIden)]
enum Sources {
    Table,
    Id,
    CatalogItemId,
    EpisodeNumber,
    Provider,
    Quality,
    SourceUrl,
    Title,
    Priority,
    IsActive,
    LastChecked,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ResolutionCache {
    Table,
    Id,
    CacheKey,
    PayloadJson,
    CreatedAt,
    ExpiresAt,
}
