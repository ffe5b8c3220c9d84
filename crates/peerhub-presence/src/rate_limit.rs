//! Store-backed request rate limiting.
//!
//! A fixed-window counter per (operation, client network identity,
//! room) key, kept in the shared cache rather than a process-local map
//! so the bound holds across instances. Exceeding the bound yields a
//! distinct rate-limited error, never a silent drop.
//!
//! The window is fixed, not sliding: a client can spend one window's
//! budget at its very end and the next window's at its very start, so
//! the worst-case burst across a boundary is 2×`max_requests`. Size
//! `max_requests` with that factor in mind.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use peerhub_cache::CacheManager;
use peerhub_cache::keys;
use peerhub_core::config::rate_limit::RateLimitConfig;
use peerhub_core::error::AppError;
use peerhub_core::result::AppResult;
use peerhub_core::traits::cache::CacheProvider;
use peerhub_core::types::RoomId;

/// Fixed-window request limiter over the cache backend.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: Arc<CacheManager>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a rate limiter over the given cache.
    pub fn new(cache: Arc<CacheManager>, config: RateLimitConfig) -> Self {
        Self { cache, config }
    }

    /// Count one request against the (operation, client, room) key.
    ///
    /// Returns `Ok(())` while the request falls within the window's
    /// budget and `RateLimited` once it exceeds it: the N-th request in
    /// a window is accepted, the N+1-th rejected.
    pub async fn check(&self, operation: &str, client: &str, room: &RoomId) -> AppResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let key = keys::rate_limit(operation, client, room);
        let count = self.cache.incr(&key).await?;
        if count == 1 {
            // First hit opens the window. If arming the TTL fails the
            // counter must not survive, or the key would count forever
            // and lock this client out permanently.
            if let Err(e) = self
                .cache
                .expire(&key, Duration::from_secs(self.config.window_seconds))
                .await
            {
                if let Err(del_err) = self.cache.delete(&key).await {
                    warn!(key, error = %del_err, "Failed to discard unarmed window counter");
                }
                return Err(e);
            }
        }

        if count > self.config.max_requests as i64 {
            warn!(operation, client, room_id = %room, count, "Rate limit exceeded");
            return Err(AppError::rate_limited(format!(
                "Too many {operation} requests; retry after the current window"
            )));
        }
        Ok(())
    }
}
