//! Presence store configuration.

use serde::{Deserialize, Serialize};

/// Presence store settings.
///
/// Presence is a periodically-refreshed, TTL-expiring cache, not a
/// strongly consistent set: a bounded staleness window is traded for
/// resilience to ungraceful browser disconnects. The TTL and poll
/// intervals are explicit, tunable parameters so staleness vs. load can
/// be tuned in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Maximum age of a presence record before it is treated as stale
    /// and excluded from query results, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Bounded retention for a room's whole presence set, independent of
    /// individual record TTLs, so an abandoned room's data is eventually
    /// reclaimed even with no further traffic. In seconds.
    #[serde(default = "default_retention")]
    pub retention_seconds: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            retention_seconds: default_retention(),
        }
    }
}

fn default_ttl() -> u64 {
    120
}

fn default_retention() -> u64 {
    3600
}
