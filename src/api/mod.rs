use axum::{
    Router,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::Store;
use crate::services::ResolverService;
use crate::state::SharedState;

mod error;
mod items;
mod observability;
mod sources;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<ResolverService> {
        &self.shared.resolver
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = if state.shared.config.server.cors_permissive {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let api_routes = Router::new()
        .route("/items", get(items::list_items))
        .route("/items", post(items::add_item))
        .route("/items/{id}", get(items::get_item))
        .route(
            "/items/{id}/episodes/{episode}/sources",
            get(sources::resolve_sources),
        )
        .route("/system/status", get(system::get_status));

    Router::new()
        .route("/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_requests))
        .layer(cors)
        .with_state(state)
}
