use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{ApiError, ApiResponse, AppState, CatalogItemDto};

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub title: String,
    pub year: Option<i32>,
    pub tmdb_id: Option<i32>,
    pub tvmaze_id: Option<i32>,
    pub episode_count: Option<i32>,
}

pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CatalogItemDto>>>, ApiError> {
    let items = state.store().list_catalog_items().await?;
    let dtos = items.into_iter().map(CatalogItemDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CatalogItemDto>>, ApiError> {
    let item = state
        .store()
        .get_catalog_item(id)
        .await?
        .ok_or_else(|| ApiError::item_not_found(id))?;

    Ok(Json(ApiResponse::success(item.into())))
}

pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<ApiResponse<CatalogItemDto>>, ApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Item title cannot be empty"));
    }

    if request.tmdb_id.is_none() && request.tvmaze_id.is_none() {
        return Err(ApiError::validation(
            "At least one external id (tmdb_id or tvmaze_id) is required",
        ));
    }

    let item = state
        .store()
        .add_catalog_item(
            title,
            request.year,
            request.tmdb_id,
            request.tvmaze_id,
            request.episode_count,
        )
        .await?;

    info!("Added catalog item '{}' (id {})", item.title, item.id);

    Ok(Json(ApiResponse::success(item.into())))
}
