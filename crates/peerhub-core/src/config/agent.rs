//! Client presence agent configuration.

use serde::{Deserialize, Serialize};

/// Client presence agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the rendezvous API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Self-announce interval in seconds. Must sit well inside the
    /// presence TTL so the record never expires while the agent is alive.
    #[serde(default = "default_announce_interval")]
    pub announce_interval_seconds: u64,
    /// Discovery poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Bounded number of session-level recovery attempts before a peer
    /// session is given up on and a session error surfaced.
    #[serde(default = "default_max_recovery_attempts")]
    pub max_recovery_attempts: u32,
    /// Directory where per-room participant identities are persisted so
    /// a reload rejoins as the same participant.
    #[serde(default = "default_identity_dir")]
    pub identity_dir: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            announce_interval_seconds: default_announce_interval(),
            poll_interval_seconds: default_poll_interval(),
            max_recovery_attempts: default_max_recovery_attempts(),
            identity_dir: default_identity_dir(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_announce_interval() -> u64 {
    60
}

fn default_poll_interval() -> u64 {
    10
}

fn default_max_recovery_attempts() -> u32 {
    2
}

fn default_identity_dir() -> String {
    "data/identity".to_string()
}

fn default_request_timeout() -> u64 {
    10
}
