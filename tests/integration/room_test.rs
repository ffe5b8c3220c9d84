//! Room lifecycle: create, fetch, validate, health.

use chrono::{Duration, Utc};
use http::StatusCode;

use peerhub_core::types::{Room, RoomId};

use crate::helpers::TestApp;

#[tokio::test]
async fn create_room_returns_short_id_and_expiry() {
    let app = TestApp::new().await;

    let response = app.request("POST", "/api/rooms", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let room_id = response.body["roomId"].as_str().unwrap();
    assert_eq!(room_id.len(), 8);

    let expires_at: chrono::DateTime<Utc> =
        response.body["expiresAt"].as_str().unwrap().parse().unwrap();
    let lifetime = expires_at - Utc::now();
    assert!(lifetime > Duration::days(6) && lifetime <= Duration::days(7));
}

#[tokio::test]
async fn created_room_is_fetchable() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

    let response = app.request("GET", &format!("/api/rooms/{room_id}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["roomId"], room_id.as_str());
    assert!(response.body["createdAt"].is_string());
    assert!(response.body["expiresAt"].is_string());
}

#[tokio::test]
async fn missing_room_is_not_found() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/rooms/zzzzzzzz", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn expired_room_is_gone() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_room(Room {
        id: RoomId::from("dead2345"),
        created_at: now - Duration::days(8),
        expires_at: now - Duration::seconds(1),
        is_active: true,
    })
    .await;

    let response = app.request("GET", "/api/rooms/dead2345", None).await;
    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(response.error_code(), "EXPIRED");
}

#[tokio::test]
async fn validate_reports_each_reason() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

    // Valid room.
    let response = app
        .request("GET", &format!("/api/rooms/{room_id}/validate"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valid"], true);
    assert!(response.body.get("reason").is_none());

    // Missing room.
    let response = app
        .request("GET", "/api/rooms/zzzzzzzz/validate", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valid"], false);
    assert_eq!(response.body["reason"], "not_found");

    // Deactivated room.
    let deactivated = app
        .state
        .rooms
        .deactivate(&RoomId::from(room_id.as_str()))
        .await
        .unwrap();
    assert!(deactivated);
    let response = app
        .request("GET", &format!("/api/rooms/{room_id}/validate"), None)
        .await;
    assert_eq!(response.body["valid"], false);
    assert_eq!(response.body["reason"], "inactive");

    // Expired room.
    let now = Utc::now();
    app.seed_room(Room {
        id: RoomId::from("dead2345"),
        created_at: now - Duration::days(8),
        expires_at: now - Duration::seconds(1),
        is_active: true,
    })
    .await;
    let response = app
        .request("GET", "/api/rooms/dead2345/validate", None)
        .await;
    assert_eq!(response.body["valid"], false);
    assert_eq!(response.body["reason"], "expired");
}

#[tokio::test]
async fn expired_wins_over_inactive() {
    let app = TestApp::new().await;
    let now = Utc::now();
    app.seed_room(Room {
        id: RoomId::from("dead2345"),
        created_at: now - Duration::days(8),
        expires_at: now - Duration::seconds(1),
        is_active: false,
    })
    .await;

    let response = app
        .request("GET", "/api/rooms/dead2345/validate", None)
        .await;
    assert_eq!(response.body["reason"], "expired");
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");

    let response = app.request("GET", "/api/health/detailed", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["registry"], "connected");
    assert_eq!(response.body["cache"], "connected");
}
