//! Room lifecycle handlers.

use axum::Json;
use axum::extract::{Path, State};

use peerhub_core::error::AppError;
use peerhub_core::types::{InvalidRoomReason, RoomId, RoomValidation};

use crate::dto::response::{CreateRoomResponse, RoomResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/rooms
pub async fn create_room(
    State(state): State<AppState>,
) -> Result<Json<CreateRoomResponse>, ApiError> {
    let room = state.rooms.create_room().await?;
    Ok(Json(CreateRoomResponse {
        room_id: room.id,
        expires_at: room.expires_at,
    }))
}

/// GET /api/rooms/{id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    let room_id = RoomId::from(room_id);
    let room = state
        .rooms
        .get_room(&room_id)
        .await?
        .ok_or_else(|| room_error(&room_id, InvalidRoomReason::NotFound))?;

    if let Some(reason) = room.invalid_reason(chrono::Utc::now()) {
        return Err(room_error(&room_id, reason).into());
    }

    Ok(Json(RoomResponse {
        room_id: room.id,
        created_at: room.created_at,
        expires_at: room.expires_at,
    }))
}

/// GET /api/rooms/{id}/validate
///
/// Always 200: validation outcomes are data for the join screen, not
/// transport errors.
pub async fn validate_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomValidation>, ApiError> {
    let room_id = RoomId::from(room_id);
    let validation = state.rooms.validate(&room_id).await?;
    Ok(Json(validation))
}

/// Build the user-facing error for an unusable room. Each reason gets
/// its own message so the join step can show why.
pub(crate) fn room_error(room_id: &RoomId, reason: InvalidRoomReason) -> AppError {
    match reason {
        InvalidRoomReason::NotFound => {
            AppError::not_found(format!("Room '{room_id}' does not exist"))
        }
        InvalidRoomReason::Expired => {
            AppError::expired(format!("Room '{room_id}' has expired"))
        }
        InvalidRoomReason::Inactive => {
            AppError::inactive(format!("Room '{room_id}' is no longer active"))
        }
    }
}
