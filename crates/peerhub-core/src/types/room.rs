//! Room entity model and the usability predicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ids::RoomId;

/// A named, time-bounded rendezvous scope for a small group of
/// participants.
///
/// Rooms are never mutated after creation except for the `is_active`
/// kill switch. Stale rows must behave as absent (via [`Room::is_usable`])
/// even before the sweep physically deletes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    /// Public room token.
    #[sqlx(try_from = "String")]
    pub id: RoomId,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// When the room expires (fixed lifetime from creation).
    pub expires_at: DateTime<Utc>,
    /// Soft-delete/kill-switch flag, independent of expiry.
    pub is_active: bool,
}

impl Room {
    /// The usability predicate: a room is usable iff
    /// `now < expires_at AND is_active`.
    ///
    /// Strict inequality: a room whose `expires_at` equals `now` is
    /// already expired. Registry-side validation and UI-facing
    /// validation must both go through this predicate.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at && self.is_active
    }

    /// Classify why the room is unusable at `now`, if it is.
    pub fn invalid_reason(&self, now: DateTime<Utc>) -> Option<InvalidRoomReason> {
        if now >= self.expires_at {
            Some(InvalidRoomReason::Expired)
        } else if !self.is_active {
            Some(InvalidRoomReason::Inactive)
        } else {
            None
        }
    }
}

/// Why a room failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRoomReason {
    /// No room with that id exists.
    NotFound,
    /// The room's lifetime has elapsed.
    Expired,
    /// The room was deactivated.
    Inactive,
}

impl InvalidRoomReason {
    /// Stable string form used in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Expired => "expired",
            Self::Inactive => "inactive",
        }
    }
}

/// Result of the side-effect-free room validation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomValidation {
    /// Whether the room is currently usable.
    pub valid: bool,
    /// Why it is not, when `valid` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidRoomReason>,
}

impl RoomValidation {
    /// A passing validation.
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// A failing validation with its reason.
    pub fn invalid(reason: InvalidRoomReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }
}
