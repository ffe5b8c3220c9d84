//! Room registry service: id generation, creation, validation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::RngExt;
use tracing::{debug, info};

use peerhub_core::config::registry::RegistryConfig;
use peerhub_core::error::AppError;
use peerhub_core::result::AppResult;
use peerhub_core::traits::room_store::RoomStore;
use peerhub_core::types::{InvalidRoomReason, Room, RoomId, RoomValidation};

/// Alphabet for generated room ids: URL-safe, lowercase, with the
/// ambiguous characters (0/o, 1/l/i) removed since codes are typed and
/// spoken.
const ROOM_ID_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

/// Room lifecycle service over a [`RoomStore`].
#[derive(Debug, Clone)]
pub struct RoomService {
    store: Arc<dyn RoomStore>,
    config: RegistryConfig,
}

impl RoomService {
    /// Create a new room service.
    pub fn new(store: Arc<dyn RoomStore>, config: RegistryConfig) -> Self {
        Self { store, config }
    }

    /// Create and persist a new room with a fresh short id.
    ///
    /// Retries id generation a bounded number of times on collision;
    /// storage failures are surfaced to the caller, never retried
    /// silently.
    pub async fn create_room(&self) -> AppResult<Room> {
        for attempt in 0..self.config.max_id_attempts {
            let now = Utc::now();
            let room = Room {
                id: self.generate_room_id(),
                created_at: now,
                expires_at: now + Duration::seconds(self.config.room_lifetime_seconds as i64),
                is_active: true,
            };

            if self.store.insert(&room).await? {
                info!(room_id = %room.id, expires_at = %room.expires_at, "Created room");
                return Ok(room);
            }
            debug!(room_id = %room.id, attempt, "Room id collision, regenerating");
        }

        Err(AppError::storage(format!(
            "Could not generate a unique room id in {} attempts",
            self.config.max_id_attempts
        )))
    }

    /// Fetch a room by its public id.
    pub async fn get_room(&self, id: &RoomId) -> AppResult<Option<Room>> {
        self.store.find_by_id(id).await
    }

    /// Apply the usability predicate. Side-effect free.
    pub async fn validate(&self, id: &RoomId) -> AppResult<RoomValidation> {
        let Some(room) = self.store.find_by_id(id).await? else {
            return Ok(RoomValidation::invalid(InvalidRoomReason::NotFound));
        };

        match room.invalid_reason(Utc::now()) {
            None => Ok(RoomValidation::valid()),
            Some(reason) => Ok(RoomValidation::invalid(reason)),
        }
    }

    /// Flip a room's kill switch off.
    pub async fn deactivate(&self, id: &RoomId) -> AppResult<bool> {
        let deactivated = self.store.deactivate(id).await?;
        if deactivated {
            info!(room_id = %id, "Deactivated room");
        }
        Ok(deactivated)
    }

    /// Physically delete rooms expired before `cutoff`, returning the
    /// ids removed so dependent state can be purged.
    pub async fn delete_expired(&self, cutoff: chrono::DateTime<Utc>) -> AppResult<Vec<RoomId>> {
        self.store.delete_expired(cutoff).await
    }

    /// Check that the backing store is reachable.
    pub async fn health(&self) -> AppResult<bool> {
        self.store.health_check().await
    }

    /// Generate a short, URL-safe, collision-resistant room id.
    fn generate_room_id(&self) -> RoomId {
        let mut rng = rand::rng();
        let id: String = (0..self.config.id_length)
            .map(|_| {
                let idx = rng.random_range(0..ROOM_ID_ALPHABET.len());
                ROOM_ID_ALPHABET[idx] as char
            })
            .collect();
        RoomId::new(id)
    }
}
