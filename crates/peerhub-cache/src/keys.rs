//! Cache key builders for all PeerHub cache entries.
//!
//! Centralising key construction prevents typos and makes it easy to
//! find every key the application uses. Presence keys are partitioned
//! by participant within a room — never a room-wide blob — so
//! concurrent writes from different participants can never interfere.

use peerhub_core::types::{ParticipantId, RoomId};

// ── Presence keys ──────────────────────────────────────────

/// Cache key for one participant's presence record in a room.
pub fn presence(room: &RoomId, participant: &ParticipantId) -> String {
    format!("presence:{room}:{participant}")
}

/// Pattern matching every presence record in a room.
pub fn presence_room_pattern(room: &RoomId) -> String {
    format!("presence:{room}:*")
}

// ── Rate limiting keys ─────────────────────────────────────

/// Cache key for a rate limit window counter, bounded per
/// (operation, client network identity, room).
pub fn rate_limit(operation: &str, client: &str, room: &RoomId) -> String {
    format!("rate:{operation}:{client}:{room}")
}
