//! In-memory room store for tests and single-node fallback.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use peerhub_core::result::AppResult;
use peerhub_core::traits::room_store::RoomStore;
use peerhub_core::types::{Room, RoomId};

/// Room storage held entirely in process memory.
///
/// Rooms are lost on restart; acceptable because rooms are ephemeral by
/// design and clients rejoin by code.
#[derive(Debug, Default)]
pub struct InMemoryRoomStore {
    rooms: DashMap<RoomId, Room>,
}

impl InMemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn insert(&self, room: &Room) -> AppResult<bool> {
        match self.rooms.entry(room.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(room.clone());
                Ok(true)
            }
        }
    }

    async fn find_by_id(&self, id: &RoomId) -> AppResult<Option<Room>> {
        Ok(self.rooms.get(id).map(|r| r.value().clone()))
    }

    async fn deactivate(&self, id: &RoomId) -> AppResult<bool> {
        match self.rooms.get_mut(id) {
            Some(mut room) => {
                room.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<RoomId>> {
        let expired: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|r| r.expires_at < cutoff)
            .map(|r| r.key().clone())
            .collect();

        for id in &expired {
            self.rooms.remove(id);
        }
        Ok(expired)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
