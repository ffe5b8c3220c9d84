//! Typed identifiers and domain models.

pub mod ids;
pub mod presence;
pub mod room;

pub use ids::{EndpointId, ParticipantId, RoomId};
pub use presence::{PresenceEntry, PresenceRecord};
pub use room::{InvalidRoomReason, Room, RoomValidation};
