//! Health check handlers.

use axum::Json;
use axum::extract::State;

use peerhub_core::traits::cache::CacheProvider;

use crate::dto::response::{DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/health/detailed
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let registry = match state.rooms.health().await {
        Ok(true) => "connected",
        _ => "unavailable",
    };
    let cache = match state.cache.health_check().await {
        Ok(true) => "connected",
        _ => "unavailable",
    };

    Json(DetailedHealthResponse {
        status: "ok".to_string(),
        registry: registry.to_string(),
        cache: cache.to_string(),
    })
}
