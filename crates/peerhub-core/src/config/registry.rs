//! Room registry configuration.

use serde::{Deserialize, Serialize};

/// Room registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Fixed room lifetime from creation, in seconds.
    #[serde(default = "default_room_lifetime")]
    pub room_lifetime_seconds: u64,
    /// Length of generated room ids.
    ///
    /// Room codes are typed and spoken, so they are deliberately short
    /// rather than full opaque UUIDs; rooms are ephemeral and low-value
    /// as attack targets within their lifetime.
    #[serde(default = "default_id_length")]
    pub id_length: usize,
    /// Maximum id-generation attempts before giving up on a collision.
    #[serde(default = "default_max_id_attempts")]
    pub max_id_attempts: u32,
    /// Cron schedule for the expired-room sweep.
    #[serde(default = "default_sweep_schedule")]
    pub sweep_schedule: String,
    /// Extra time past expiry before a room row is physically deleted.
    ///
    /// Correctness never depends on the sweep: the usability predicate
    /// already hides expired rows.
    #[serde(default = "default_sweep_grace")]
    pub sweep_grace_seconds: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            room_lifetime_seconds: default_room_lifetime(),
            id_length: default_id_length(),
            max_id_attempts: default_max_id_attempts(),
            sweep_schedule: default_sweep_schedule(),
            sweep_grace_seconds: default_sweep_grace(),
        }
    }
}

fn default_room_lifetime() -> u64 {
    // 7 days
    604_800
}

fn default_id_length() -> usize {
    8
}

fn default_max_id_attempts() -> u32 {
    5
}

fn default_sweep_schedule() -> String {
    // top of every hour
    "0 0 * * * *".to_string()
}

fn default_sweep_grace() -> u64 {
    86_400
}
