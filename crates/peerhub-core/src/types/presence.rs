//! Presence record model and the liveness predicate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{EndpointId, ParticipantId, RoomId};

/// A timestamped claim that a participant is currently reachable in a
/// room at a rendezvous endpoint.
///
/// At most one live record exists per (room, participant) pair; a new
/// announcement from the same participant replaces the prior record.
/// Records are owned exclusively by their participant — the rendezvous
/// API, not the store, enforces that only the owning agent writes or
/// deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    /// Room the participant is in.
    pub room_id: RoomId,
    /// The participant claiming presence.
    pub participant_id: ParticipantId,
    /// Where other peers can open a media session with them.
    pub endpoint_id: EndpointId,
    /// When the claim was last refreshed.
    pub last_seen: DateTime<Utc>,
}

impl PresenceRecord {
    /// The liveness predicate: a record is live iff
    /// `now - last_seen < ttl`.
    ///
    /// Expired records must never be surfaced to queriers, even if not
    /// yet physically purged.
    pub fn is_live(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_seen) < ttl
    }
}

/// The wire shape of one participant in a presence listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    /// The participant's id.
    pub participant_id: ParticipantId,
    /// The endpoint peers should dial.
    pub endpoint_id: EndpointId,
    /// When the participant last announced.
    pub last_seen: DateTime<Utc>,
}

impl From<PresenceRecord> for PresenceEntry {
    fn from(record: PresenceRecord) -> Self {
        Self {
            participant_id: record.participant_id,
            endpoint_id: record.endpoint_id,
            last_seen: record.last_seen,
        }
    }
}
