//! Stable per-room participant identity, persisted locally.
//!
//! A reload rejoins as "the same" participant because the id is read
//! back from disk. Only an explicit leave clears it.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use peerhub_core::result::AppResult;
use peerhub_core::types::{ParticipantId, RoomId};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredIdentity {
    participant_id: ParticipantId,
}

/// File-backed store of one participant id per room.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    dir: PathBuf,
}

impl IdentityStore {
    /// Create a store rooted at `dir`. The directory is created lazily
    /// on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, room_id: &RoomId) -> PathBuf {
        self.dir.join(format!("room-{room_id}.json"))
    }

    /// Return the persisted participant id for `room_id`, generating
    /// and persisting a fresh one if none exists. A corrupt identity
    /// file is discarded, not fatal.
    pub async fn load_or_create(&self, room_id: &RoomId) -> AppResult<ParticipantId> {
        let path = self.path_for(room_id);

        match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<StoredIdentity>(&bytes) {
                Ok(stored) => {
                    debug!(room_id = %room_id, participant_id = %stored.participant_id, "Reusing persisted identity");
                    return Ok(stored.participant_id);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt identity file, regenerating");
                }
            },
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let participant_id = ParticipantId::generate();
        self.persist(&path, &participant_id).await?;
        debug!(room_id = %room_id, participant_id = %participant_id, "Generated new identity");
        Ok(participant_id)
    }

    async fn persist(&self, path: &Path, participant_id: &ParticipantId) -> AppResult<()> {
        fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_vec_pretty(&StoredIdentity {
            participant_id: participant_id.clone(),
        })?;
        fs::write(path, body).await?;
        Ok(())
    }

    /// Forget the identity for `room_id`. Idempotent.
    pub async fn clear(&self, room_id: &RoomId) -> AppResult<()> {
        match fs::remove_file(self.path_for(room_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_store() -> IdentityStore {
        IdentityStore::new(std::env::temp_dir().join(format!("peerhub-identity-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn identity_is_stable_across_loads() {
        let store = scratch_store();
        let room = RoomId::from("abc23456");

        let first = store.load_or_create(&room).await.unwrap();
        let second = store.load_or_create(&room).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn identities_differ_per_room() {
        let store = scratch_store();
        let a = store.load_or_create(&RoomId::from("room2345")).await.unwrap();
        let b = store.load_or_create(&RoomId::from("other234")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn clear_forces_a_new_identity() {
        let store = scratch_store();
        let room = RoomId::from("abc23456");

        let first = store.load_or_create(&room).await.unwrap();
        store.clear(&room).await.unwrap();
        let second = store.load_or_create(&room).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = scratch_store();
        let room = RoomId::from("abc23456");
        store.clear(&room).await.unwrap();
        store.clear(&room).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_regenerates() {
        let store = scratch_store();
        let room = RoomId::from("abc23456");

        let first = store.load_or_create(&room).await.unwrap();
        fs::write(store.path_for(&room), b"not json").await.unwrap();
        let second = store.load_or_create(&room).await.unwrap();
        assert_ne!(first, second);
    }
}
