//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use peerhub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Local wrapper so the domain error can cross the axum response
/// boundary; the orphan rule forbids `impl IntoResponse for AppError`
/// here since both the trait and the type are foreign to this crate.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self(err) = self;
        let (status, error_code) = match &err.kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            // 410: the room existed but is no longer joinable. Distinct
            // codes so the join screen can word each case differently.
            ErrorKind::Expired => (StatusCode::GONE, "EXPIRED"),
            ErrorKind::Inactive => (StatusCode::GONE, "INACTIVE"),
            ErrorKind::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            ErrorKind::ServiceUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ErrorKind::Storage | ErrorKind::Cache => {
                tracing::error!(error = %err.message, kind = %err.kind, "Backing store error");
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
            }
            _ => {
                tracing::error!(error = %err.message, kind = %err.kind, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: err.message.clone(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_statuses_per_join_failure() {
        let not_found = ApiError::from(AppError::not_found("no such room")).into_response();
        let expired = ApiError::from(AppError::expired("room expired")).into_response();
        let limited = ApiError::from(AppError::rate_limited("slow down")).into_response();

        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(expired.status(), StatusCode::GONE);
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
