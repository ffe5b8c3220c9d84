//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use peerhub_core::types::{ParticipantId, PresenceEntry, RoomId};

/// Response to room creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    /// The new room's public token.
    pub room_id: RoomId,
    /// When the room expires.
    pub expires_at: DateTime<Utc>,
}

/// Room details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    /// The room's public token.
    pub room_id: RoomId,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// When the room expires.
    pub expires_at: DateTime<Utc>,
}

/// Response to a presence announce.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncePresenceResponse {
    /// Whether the announce was applied.
    pub success: bool,
    /// The (possibly server-assigned) participant id the caller must
    /// use for refreshes and removal.
    pub participant_id: ParticipantId,
}

/// Response to a presence listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPresenceResponse {
    /// The live participants in the room.
    pub participants: Vec<PresenceEntry>,
}

/// Bare success/failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Whether the operation succeeded.
    pub success: bool,
}

/// Basic health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status string.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Service status string.
    pub status: String,
    /// Durable room store reachability.
    pub registry: String,
    /// Presence cache reachability.
    pub cache: String,
}
