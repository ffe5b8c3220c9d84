//! Request DTOs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Body of a presence announce call.
///
/// `participant_id` is omitted on a participant's very first announce;
/// the server assigns one. `timestamp` defaults to the server clock when
/// omitted.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncePresenceRequest {
    /// Stable per-room participant token, if the client already has one.
    #[validate(length(min = 1, max = 128))]
    pub participant_id: Option<String>,
    /// The endpoint other peers should dial.
    #[validate(length(min = 1, max = 256))]
    pub endpoint_id: String,
    /// Client-side announce time; last-timestamp-wins at the store.
    pub timestamp: Option<DateTime<Utc>>,
}
