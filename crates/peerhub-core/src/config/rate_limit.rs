//! Rendezvous API rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Rate limiting settings.
///
/// Requests are bounded per (operation, client, room) key inside a
/// window so a single misbehaving client cannot starve the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enforced.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum requests per key per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_seconds: default_window(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    30
}

fn default_window() -> u64 {
    60
}
