//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use peerhub_cache::CacheManager;
use peerhub_core::config::AppConfig;
use peerhub_presence::{PresenceStore, RateLimiter};
use peerhub_registry::RoomService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Cache manager (Redis or in-memory).
    pub cache: Arc<CacheManager>,
    /// Room registry service.
    pub rooms: Arc<RoomService>,
    /// Presence store.
    pub presence: Arc<PresenceStore>,
    /// Request rate limiter.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Assemble state from already-constructed services.
    pub fn new(
        config: Arc<AppConfig>,
        cache: Arc<CacheManager>,
        rooms: Arc<RoomService>,
    ) -> Self {
        let presence = Arc::new(PresenceStore::new(Arc::clone(&cache), &config.presence));
        let rate_limiter = Arc::new(RateLimiter::new(
            Arc::clone(&cache),
            config.rate_limit.clone(),
        ));
        Self {
            config,
            cache,
            rooms,
            presence,
            rate_limiter,
        }
    }
}
