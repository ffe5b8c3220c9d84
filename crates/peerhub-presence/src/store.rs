//! Presence store over the expiring key-value cache.
//!
//! Each (room, participant) pair owns exactly one cache key, so
//! concurrent announces from different participants can never clobber
//! each other's records — there is no room-wide blob and no
//! read-modify-write across the room's record collection. Individual
//! record freshness is a read-side predicate on `last_seen`; the cache
//! key TTL only bounds retention so an abandoned room's data is
//! eventually reclaimed with no further traffic.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tracing::debug;

use peerhub_cache::CacheManager;
use peerhub_cache::keys;
use peerhub_core::config::presence::PresenceConfig;
use peerhub_core::result::AppResult;
use peerhub_core::traits::cache::CacheProvider;
use peerhub_core::types::{ParticipantId, PresenceRecord, RoomId};

/// TTL-expiring presence store keyed by (room, participant).
#[derive(Debug, Clone)]
pub struct PresenceStore {
    cache: Arc<CacheManager>,
    /// Liveness window for individual records.
    ttl: Duration,
    /// Retention bound for stored keys.
    retention: StdDuration,
}

impl PresenceStore {
    /// Create a presence store over the given cache.
    pub fn new(cache: Arc<CacheManager>, config: &PresenceConfig) -> Self {
        Self {
            cache,
            ttl: Duration::seconds(config.ttl_seconds as i64),
            retention: StdDuration::from_secs(config.retention_seconds),
        }
    }

    /// The configured liveness window.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Atomically replace-or-insert the record for a participant.
    ///
    /// Last-timestamp-wins: an upsert carrying an older `last_seen` than
    /// the stored record is dropped, so network reordering of two
    /// announce calls cannot roll a record backwards.
    pub async fn upsert(&self, record: &PresenceRecord) -> AppResult<()> {
        let key = keys::presence(&record.room_id, &record.participant_id);

        if let Some(existing) = self.cache.get_json::<PresenceRecord>(&key).await? {
            if existing.last_seen > record.last_seen {
                debug!(
                    room_id = %record.room_id,
                    participant_id = %record.participant_id,
                    "Ignoring stale presence upsert"
                );
                return Ok(());
            }
        }

        self.cache.set_json(&key, record, self.retention).await
    }

    /// Return the live presence records for a room.
    ///
    /// Malformed stored entries are dropped (with a debug log) rather
    /// than failing the whole query; records past the liveness window
    /// are filtered out even if not yet physically purged.
    pub async fn list(&self, room: &RoomId) -> AppResult<Vec<PresenceRecord>> {
        let pairs = self.cache.scan(&keys::presence_room_pattern(room)).await?;
        let now = Utc::now();

        let records = pairs
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_str(&value) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(key, error = %e, "Dropping malformed presence entry");
                    None
                }
            })
            .filter(|record: &PresenceRecord| record.is_live(now, self.ttl))
            .collect();

        Ok(records)
    }

    /// Whether a participant currently has a stored record in a room.
    ///
    /// Used by the announce existence-gating optimization; staleness is
    /// acceptable there because a record in a dead room expires on its
    /// own.
    pub async fn contains(&self, room: &RoomId, participant: &ParticipantId) -> AppResult<bool> {
        self.cache.exists(&keys::presence(room, participant)).await
    }

    /// Explicitly delete a participant's record. Idempotent.
    pub async fn remove(&self, room: &RoomId, participant: &ParticipantId) -> AppResult<()> {
        self.cache.delete(&keys::presence(room, participant)).await
    }

    /// Reclaim a room's entire presence set.
    pub async fn expire_room(&self, room: &RoomId) -> AppResult<u64> {
        self.cache
            .delete_pattern(&keys::presence_room_pattern(room))
            .await
    }
}
