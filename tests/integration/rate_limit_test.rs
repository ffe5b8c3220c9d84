//! Request rate limiting over the API surface.

use http::StatusCode;
use serde_json::json;

use peerhub_core::config::AppConfig;
use peerhub_core::config::rate_limit::RateLimitConfig;

use crate::helpers::{TestApp, test_config};

fn limited_config(max_requests: u32) -> AppConfig {
    AppConfig {
        rate_limit: RateLimitConfig {
            enabled: true,
            max_requests,
            window_seconds: 60,
        },
        ..test_config()
    }
}

#[tokio::test]
async fn announce_is_limited_per_window() {
    let app = TestApp::with_config(limited_config(3)).await;
    let room_id = app.create_room().await;

    let body = json!({
        "participantId": "p-1",
        "endpointId": format!("ph-{room_id}-p-1"),
    });

    // The N-th request is accepted, the N+1-th rejected.
    for _ in 0..3 {
        let response = app
            .request(
                "POST",
                &format!("/api/rooms/{room_id}/presence"),
                Some(body.clone()),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = app
        .request(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(body),
        )
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.error_code(), "RATE_LIMITED");
}

#[tokio::test]
async fn limit_is_scoped_per_client_and_operation() {
    let app = TestApp::with_config(limited_config(1)).await;
    let room_id = app.create_room().await;

    let announce = |participant: &str| {
        json!({
            "participantId": participant,
            "endpointId": format!("ph-{room_id}-{participant}"),
        })
    };

    let response = app
        .request_from(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(announce("p-1")),
            "10.0.0.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Same client again: limited.
    let response = app
        .request_from(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(announce("p-1")),
            "10.0.0.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    // A different client still gets through.
    let response = app
        .request_from(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(announce("p-2")),
            "10.0.0.2",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // A different operation from the limited client also gets through.
    let response = app
        .request_from(
            "GET",
            &format!("/api/rooms/{room_id}/presence"),
            None,
            "10.0.0.1",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn disabled_limiter_never_rejects() {
    let mut config = test_config();
    config.rate_limit = RateLimitConfig {
        enabled: false,
        max_requests: 1,
        window_seconds: 60,
    };
    let app = TestApp::with_config(config).await;
    let room_id = app.create_room().await;

    for _ in 0..5 {
        let response = app
            .request(
                "POST",
                &format!("/api/rooms/{room_id}/presence"),
                Some(json!({
                    "participantId": "p-1",
                    "endpointId": format!("ph-{room_id}-p-1"),
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
}
