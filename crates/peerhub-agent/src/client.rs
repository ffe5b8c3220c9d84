//! HTTP client for the rendezvous API.
//!
//! Thin request/response wrapper: callers decide retry policy. Error
//! responses are mapped back onto the domain error taxonomy using the
//! API's stable error codes, so the join path can distinguish a dead
//! room from a rate limit.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use peerhub_core::config::agent::AgentConfig;
use peerhub_core::error::{AppError, ErrorKind};
use peerhub_core::result::AppResult;
use peerhub_core::types::{EndpointId, ParticipantId, PresenceEntry, RoomId, RoomValidation};

/// A freshly created room.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoom {
    /// The room's public token.
    pub room_id: RoomId,
    /// When the room stops being joinable.
    pub expires_at: DateTime<Utc>,
}

/// Room metadata as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    /// The room's public token.
    pub room_id: RoomId,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// When the room stops being joinable.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnounceBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    participant_id: Option<&'a ParticipantId>,
    endpoint_id: &'a EndpointId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnounceReply {
    #[allow(dead_code)]
    success: bool,
    participant_id: ParticipantId,
}

#[derive(Debug, Deserialize)]
struct PresenceList {
    participants: Vec<PresenceEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

/// Client for the rendezvous HTTP API.
#[derive(Debug, Clone)]
pub struct RendezvousClient {
    base_url: String,
    http: reqwest::Client,
}

impl RendezvousClient {
    /// Build a client from agent configuration.
    pub fn new(config: &AgentConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Create a new room.
    pub async fn create_room(&self) -> AppResult<CreatedRoom> {
        let response = self
            .http
            .post(format!("{}/api/rooms", self.base_url))
            .send()
            .await
            .map_err(request_error)?;
        Self::parse(response).await
    }

    /// Fetch a room's metadata.
    pub async fn get_room(&self, room_id: &RoomId) -> AppResult<RoomInfo> {
        let response = self
            .http
            .get(format!("{}/api/rooms/{room_id}", self.base_url))
            .send()
            .await
            .map_err(request_error)?;
        Self::parse(response).await
    }

    /// Check whether a room is currently joinable.
    pub async fn validate_room(&self, room_id: &RoomId) -> AppResult<RoomValidation> {
        let response = self
            .http
            .get(format!("{}/api/rooms/{room_id}/validate", self.base_url))
            .send()
            .await
            .map_err(request_error)?;
        Self::parse(response).await
    }

    /// Publish or refresh presence. Returns the participant id the
    /// server assigned (the supplied one when given).
    pub async fn announce(
        &self,
        room_id: &RoomId,
        participant_id: Option<&ParticipantId>,
        endpoint_id: &EndpointId,
    ) -> AppResult<ParticipantId> {
        let response = self
            .http
            .post(format!("{}/api/rooms/{room_id}/presence", self.base_url))
            .json(&AnnounceBody {
                participant_id,
                endpoint_id,
            })
            .send()
            .await
            .map_err(request_error)?;
        let reply: AnnounceReply = Self::parse(response).await?;
        Ok(reply.participant_id)
    }

    /// Fetch the live participant list for a room.
    pub async fn list_presence(&self, room_id: &RoomId) -> AppResult<Vec<PresenceEntry>> {
        let response = self
            .http
            .get(format!("{}/api/rooms/{room_id}/presence", self.base_url))
            .send()
            .await
            .map_err(request_error)?;
        let list: PresenceList = Self::parse(response).await?;
        Ok(list.participants)
    }

    /// Retract a presence record. Idempotent.
    pub async fn remove_presence(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> AppResult<()> {
        let response = self
            .http
            .delete(format!(
                "{}/api/rooms/{room_id}/presence/{participant_id}",
                self.base_url
            ))
            .send()
            .await
            .map_err(request_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| {
                AppError::new(ErrorKind::Serialization, format!("Malformed API response: {e}"))
            })
    }

    /// Map an error response back onto the domain taxonomy via its
    /// stable error code, falling back to the HTTP status.
    async fn error_from(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.json::<ErrorBody>().await.ok();
        let (code, message) = match body {
            Some(b) => (b.error, b.message),
            None => (String::new(), format!("HTTP {status}")),
        };

        match code.as_str() {
            "VALIDATION_ERROR" => AppError::validation(message),
            "NOT_FOUND" => AppError::not_found(message),
            "EXPIRED" => AppError::expired(message),
            "INACTIVE" => AppError::inactive(message),
            "RATE_LIMITED" => AppError::rate_limited(message),
            "STORE_UNAVAILABLE" | "SERVICE_UNAVAILABLE" => AppError::service_unavailable(message),
            _ => AppError::external(format!("Rendezvous API error ({status}): {message}")),
        }
    }
}

fn request_error(e: reqwest::Error) -> AppError {
    AppError::external(format!("Rendezvous request failed: {e}"))
}
