//! PostgreSQL room repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use peerhub_core::error::{AppError, ErrorKind};
use peerhub_core::result::AppResult;
use peerhub_core::traits::room_store::RoomStore;
use peerhub_core::types::{Room, RoomId};

/// Durable room storage backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgRoomStore {
    pool: PgPool,
}

impl PgRoomStore {
    /// Create a new room store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomStore for PgRoomStore {
    async fn insert(&self, room: &Room) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO rooms (id, created_at, expires_at, is_active) VALUES ($1, $2, $3, $4)",
        )
        .bind(room.id.as_str())
        .bind(room.created_at)
        .bind(room.expires_at)
        .bind(room.is_active)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                "Failed to insert room",
                e,
            )),
        }
    }

    async fn find_by_id(&self, id: &RoomId) -> AppResult<Option<Room>> {
        sqlx::query_as::<_, Room>(
            "SELECT id, created_at, expires_at, is_active FROM rooms WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find room", e))
    }

    async fn deactivate(&self, id: &RoomId) -> AppResult<bool> {
        let result = sqlx::query("UPDATE rooms SET is_active = FALSE WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to deactivate room", e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<RoomId>> {
        let ids: Vec<String> =
            sqlx::query_scalar("DELETE FROM rooms WHERE expires_at < $1 RETURNING id")
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to delete expired rooms", e)
                })?;

        Ok(ids.into_iter().map(RoomId::from).collect())
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Health check failed", e))
    }
}
