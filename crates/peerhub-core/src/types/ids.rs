//! Typed identifiers for rooms, participants, and rendezvous endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace prefix applied to every rendezvous endpoint id, so two
/// independent rooms never collide in the transport's global namespace.
const ENDPOINT_NAMESPACE: &str = "ph";

/// Public room token handed out to participants.
///
/// Distinct from any internal storage key; short enough to be typed or
/// spoken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wrap an existing room id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque per-room participant token.
///
/// Stable for one participant within one room (persisted client-side so
/// a reload rejoins as the same participant), never shared across rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wrap an existing participant id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh participant id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The address another peer uses to open a direct media session with a
/// participant.
///
/// Distinct from the participant id: one participant could in principle
/// hold multiple endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    /// Wrap an existing endpoint id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the namespaced endpoint id for a participant in a room:
    /// `ph-{room}-{participant}`.
    pub fn for_participant(room: &RoomId, participant: &ParticipantId) -> Self {
        Self(format!("{ENDPOINT_NAMESPACE}-{room}-{participant}"))
    }

    /// Extract the participant portion of a namespaced endpoint id built
    /// for `room`. Returns `None` for foreign or malformed endpoints.
    pub fn participant_in(&self, room: &RoomId) -> Option<ParticipantId> {
        let rest = self.0.strip_prefix(ENDPOINT_NAMESPACE)?.strip_prefix('-')?;
        let rest = rest.strip_prefix(room.as_str())?.strip_prefix('-')?;
        if rest.is_empty() {
            None
        } else {
            Some(ParticipantId::new(rest))
        }
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EndpointId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
