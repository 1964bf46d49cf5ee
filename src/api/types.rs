use serde::Serialize;

use crate::entities::catalog_item;
use crate::models::{AdapterFailure, ResolvedSource};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogItemDto {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub tmdb_id: Option<i32>,
    pub tvmaze_id: Option<i32>,
    pub episode_count: Option<i32>,
    pub added_at: String,
}

impl From<catalog_item::Model> for CatalogItemDto {
    fn from(m: catalog_item::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            year: m.year,
            tmdb_id: m.tmdb_id,
            tvmaze_id: m.tvmaze_id,
            episode_count: m.episode_count,
            added_at: m.added_at,
        }
    }
}

/// Resolution response envelope. Unlike the generic [`ApiResponse`], the
/// resolution endpoint always reports totals, the applied filters, and any
/// provider failures next to the data.
#[derive(Debug, Serialize)]
pub struct ResolutionDto {
    pub success: bool,
    pub data: EpisodeSourcesDto,
    pub total: usize,
    pub filters: FiltersDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    pub errors: Vec<AdapterFailure>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct EpisodeSourcesDto {
    pub episode: i32,
    pub sources: Vec<ResolvedSource>,
}

#[derive(Debug, Serialize)]
pub struct FiltersDto {
    pub quality: Option<String>,
    pub limit: usize,
    pub providers: Option<Vec<String>>,
    pub verify: bool,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: u64,
    pub database: bool,
    pub providers: Vec<String>,
    pub sources_total: u64,
    pub sources_active: u64,
}
