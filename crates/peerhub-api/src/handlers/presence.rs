//! Presence announce/list/remove handlers.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{Duration, Utc};
use validator::Validate;

use peerhub_core::error::AppError;
use peerhub_core::types::{EndpointId, ParticipantId, PresenceRecord, RoomId};

use crate::dto::request::AnnouncePresenceRequest;
use crate::dto::response::{AnnouncePresenceResponse, ListPresenceResponse, SuccessResponse};
use crate::error::ApiError;
use crate::extractors::ClientIp;
use crate::handlers::room::room_error;
use crate::state::AppState;

/// Tolerated client clock skew on announce timestamps. Anything beyond
/// this is clamped: a far-future `last_seen` would pin the record live
/// until retention purges it and, via last-timestamp-wins, block the
/// participant's own legitimate refreshes.
const MAX_TIMESTAMP_SKEW_SECONDS: i64 = 30;

/// POST /api/rooms/{id}/presence
///
/// Publishes or refreshes the caller's presence record. A new
/// participant's first announce is gated on room usability; a refresh
/// of an existing record skips the registry lookup — safe because the
/// record expires on its own if the room dies.
pub async fn announce(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    client: ClientIp,
    Json(req): Json<AnnouncePresenceRequest>,
) -> Result<Json<AnnouncePresenceResponse>, ApiError> {
    let room_id = RoomId::from(room_id);
    state
        .rate_limiter
        .check("announce", client.as_str(), &room_id)
        .await?;

    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid announce payload: {e}")))?;

    let (participant_id, refreshing) = match req.participant_id {
        Some(id) => {
            let participant = ParticipantId::new(id);
            let known = state.presence.contains(&room_id, &participant).await?;
            (participant, known)
        }
        None => (ParticipantId::generate(), false),
    };

    if !refreshing {
        let validation = state.rooms.validate(&room_id).await?;
        if let Some(reason) = validation.reason {
            return Err(room_error(&room_id, reason).into());
        }
    }

    let now = Utc::now();
    let ceiling = now + Duration::seconds(MAX_TIMESTAMP_SKEW_SECONDS);
    let record = PresenceRecord {
        room_id,
        participant_id: participant_id.clone(),
        endpoint_id: EndpointId::new(req.endpoint_id),
        last_seen: req.timestamp.unwrap_or(now).min(ceiling),
    };
    state.presence.upsert(&record).await?;

    Ok(Json(AnnouncePresenceResponse {
        success: true,
        participant_id,
    }))
}

/// GET /api/rooms/{id}/presence
pub async fn list(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    client: ClientIp,
) -> Result<Json<ListPresenceResponse>, ApiError> {
    let room_id = RoomId::from(room_id);
    state
        .rate_limiter
        .check("list", client.as_str(), &room_id)
        .await?;

    let participants = state
        .presence
        .list(&room_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListPresenceResponse { participants }))
}

/// DELETE /api/rooms/{id}/presence/{participant}
///
/// Idempotent; authorized only by possession of the participant id.
/// Participant ids are per-room ephemeral secrets with no access to
/// anything else, which is the accepted trust boundary here.
pub async fn remove(
    State(state): State<AppState>,
    Path((room_id, participant_id)): Path<(String, String)>,
    client: ClientIp,
) -> Result<Json<SuccessResponse>, ApiError> {
    let room_id = RoomId::from(room_id);
    state
        .rate_limiter
        .check("remove", client.as_str(), &room_id)
        .await?;

    state
        .presence
        .remove(&room_id, &ParticipantId::new(participant_id))
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}
