use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, EpisodeSourcesDto, FiltersDto, ResolutionDto};
use crate::constants;
use crate::models::ResolutionRequest;
use crate::quality::Quality;

#[derive(Debug, Deserialize)]
pub struct SourceQuery {
    pub quality: Option<String>,
    pub limit: Option<usize>,
    /// Comma-separated subset of provider names.
    pub providers: Option<String>,
    pub verify: Option<bool>,
    pub bypass_cache: Option<bool>,
}

/// `GET /api/items/{id}/episodes/{episode}/sources`
///
/// Resolves playable sources for one episode: provider fan-out,
/// normalization, reconciliation against persisted state, optional liveness
/// verification, and the short-TTL result cache.
pub async fn resolve_sources(
    State(state): State<Arc<AppState>>,
    Path((item_id, episode)): Path<(i32, i32)>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<ResolutionDto>, ApiError> {
    let quality = match query.quality.as_deref() {
        None => None,
        Some(label) => Some(Quality::parse(label).ok_or_else(|| {
            ApiError::validation(format!("Unknown quality filter: {label}"))
        })?),
    };

    let providers = query.providers.as_deref().map(|names| {
        names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    });

    let request = ResolutionRequest {
        catalog_item_id: item_id,
        episode,
        quality,
        providers: providers.clone(),
        limit: query
            .limit
            .unwrap_or(constants::resolver::DEFAULT_RESULT_LIMIT),
        verify: query.verify.unwrap_or(true),
        bypass_cache: query.bypass_cache.unwrap_or(false),
    };

    let filters = FiltersDto {
        quality: request.quality.map(|q| q.to_string()),
        limit: request.limit,
        providers,
        verify: request.verify,
    };

    let outcome = state.resolver().resolve(request).await?;

    Ok(Json(ResolutionDto {
        success: true,
        total: outcome.sources.len(),
        cached: outcome.cached.then_some(true),
        data: EpisodeSourcesDto {
            episode: outcome.episode,
            sources: outcome.sources,
        },
        filters,
        errors: outcome.errors,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
