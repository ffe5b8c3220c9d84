//! Route definitions for the rendezvous HTTP API.
//!
//! All routes mount under `/api`. The router receives `AppState` and
//! threads it through every handler via Axum's `State` extractor.

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use peerhub_core::config::app::CorsConfig;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(room_routes())
        .merge(presence_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Room lifecycle: create, fetch, validate.
fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(handlers::room::create_room))
        .route("/rooms/{id}", get(handlers::room::get_room))
        .route("/rooms/{id}/validate", get(handlers::room::validate_room))
}

/// Presence announce/list/remove within a room.
fn presence_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms/{id}/presence", post(handlers::presence::announce))
        .route("/rooms/{id}/presence", get(handlers::presence::list))
        .route(
            "/rooms/{id}/presence/{participant}",
            delete(handlers::presence::remove),
        )
}

/// Health check endpoints.
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Build the CORS layer from configuration.
///
/// Browsers join rooms from a different origin than this service, so
/// CORS is part of the public surface rather than an afterthought.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    use tower_http::cors::Any;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(config.max_age_seconds));

    if config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors
}
