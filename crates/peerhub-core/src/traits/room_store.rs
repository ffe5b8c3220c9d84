//! Durable room storage trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;
use crate::types::{Room, RoomId};

/// Trait for durable room storage (PostgreSQL in production, in-memory
/// for tests and single-node fallback).
///
/// The store persists rooms verbatim; the usability predicate lives on
/// [`Room`] and is applied by the registry service, so every caller
/// sees identical expiry semantics.
#[async_trait]
pub trait RoomStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new room. Returns `false` without writing when the id
    /// already exists (the caller decides whether to retry with a fresh
    /// id); any other failure is a storage error, never silently retried.
    async fn insert(&self, room: &Room) -> AppResult<bool>;

    /// Fetch a room by its public id.
    async fn find_by_id(&self, id: &RoomId) -> AppResult<Option<Room>>;

    /// Flip a room's active flag off. Returns false if the room is absent.
    async fn deactivate(&self, id: &RoomId) -> AppResult<bool>;

    /// Physically delete rooms whose expiry is older than `cutoff`,
    /// returning the ids removed so dependent state can be purged.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<RoomId>>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
