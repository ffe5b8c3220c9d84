//! Presence announce/list/remove over the API.

use chrono::{Duration, Utc};
use http::StatusCode;
use serde_json::json;

use peerhub_core::types::{Room, RoomId};

use crate::helpers::TestApp;

#[tokio::test]
async fn announce_assigns_participant_id_when_omitted() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

    let response = app
        .request(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(json!({ "endpointId": format!("ph-{room_id}-x") })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["success"], true);

    let participant_id = response.body["participantId"].as_str().unwrap();
    assert!(!participant_id.is_empty());

    let list = app
        .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
        .await;
    let participants = list.body["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["participantId"], participant_id);
}

#[tokio::test]
async fn two_participants_see_each_other() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

    for name in ["p-1", "p-2"] {
        let response = app
            .request(
                "POST",
                &format!("/api/rooms/{room_id}/presence"),
                Some(json!({
                    "participantId": name,
                    "endpointId": format!("ph-{room_id}-{name}"),
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["participantId"], name);
    }

    let list = app
        .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
        .await;
    let participants = list.body["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 2);
}

#[tokio::test]
async fn repeated_announce_replaces_instead_of_duplicating() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;
    let t1 = Utc::now();
    let t2 = t1 + Duration::seconds(30);

    for timestamp in [t1, t2] {
        let response = app
            .request(
                "POST",
                &format!("/api/rooms/{room_id}/presence"),
                Some(json!({
                    "participantId": "p-1",
                    "endpointId": format!("ph-{room_id}-p-1"),
                    "timestamp": timestamp,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let list = app
        .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
        .await;
    let participants = list.body["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);

    let last_seen: chrono::DateTime<Utc> =
        participants[0]["lastSeen"].as_str().unwrap().parse().unwrap();
    assert_eq!(last_seen, t2);
}

#[tokio::test]
async fn out_of_order_announce_keeps_newest_timestamp() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;
    let newer = Utc::now();
    let older = newer - Duration::seconds(45);

    // Network delivery order is not timestamp order.
    for timestamp in [newer, older] {
        let response = app
            .request(
                "POST",
                &format!("/api/rooms/{room_id}/presence"),
                Some(json!({
                    "participantId": "p-1",
                    "endpointId": format!("ph-{room_id}-p-1"),
                    "timestamp": timestamp,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let list = app
        .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
        .await;
    let last_seen: chrono::DateTime<Utc> = list.body["participants"][0]["lastSeen"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(last_seen, newer);
}

#[tokio::test]
async fn far_future_timestamp_is_clamped() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

    let response = app
        .request(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(json!({
                "participantId": "p-1",
                "endpointId": format!("ph-{room_id}-p-1"),
                "timestamp": Utc::now() + Duration::days(1),
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // The stored record must not carry the bogus timestamp: it would
    // stay "live" until retention and outrank every honest refresh.
    let list = app
        .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
        .await;
    let last_seen: chrono::DateTime<Utc> = list.body["participants"][0]["lastSeen"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(last_seen <= Utc::now() + Duration::seconds(60));
}

#[tokio::test]
async fn stale_records_are_excluded_from_listing() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

    // TTL default is 120s; one record well past it, one fresh.
    let response = app
        .request(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(json!({
                "participantId": "gone",
                "endpointId": format!("ph-{room_id}-gone"),
                "timestamp": Utc::now() - Duration::seconds(121),
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(json!({
                "participantId": "here",
                "endpointId": format!("ph-{room_id}-here"),
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let list = app
        .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
        .await;
    let participants = list.body["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["participantId"], "here");
}

#[tokio::test]
async fn remove_is_idempotent() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

    app.request(
        "POST",
        &format!("/api/rooms/{room_id}/presence"),
        Some(json!({
            "participantId": "p-1",
            "endpointId": format!("ph-{room_id}-p-1"),
        })),
    )
    .await;

    for _ in 0..2 {
        let response = app
            .request(
                "DELETE",
                &format!("/api/rooms/{room_id}/presence/p-1"),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["success"], true);
    }

    let list = app
        .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
        .await;
    assert!(list.body["participants"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn one_participant_leaving_does_not_remove_the_other() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

    for name in ["p-1", "p-2"] {
        app.request(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(json!({
                "participantId": name,
                "endpointId": format!("ph-{room_id}-{name}"),
            })),
        )
        .await;
    }

    let response = app
        .request(
            "DELETE",
            &format!("/api/rooms/{room_id}/presence/p-1"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let list = app
        .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
        .await;
    let participants = list.body["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["participantId"], "p-2");
}

#[tokio::test]
async fn first_announce_is_gated_on_room_usability() {
    let app = TestApp::new().await;

    // Missing room.
    let response = app
        .request(
            "POST",
            "/api/rooms/zzzzzzzz/presence",
            Some(json!({ "endpointId": "ph-zzzzzzzz-x" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "NOT_FOUND");

    // Expired room.
    let now = Utc::now();
    app.seed_room(Room {
        id: RoomId::from("dead2345"),
        created_at: now - chrono::Duration::days(8),
        expires_at: now - chrono::Duration::seconds(1),
        is_active: true,
    })
    .await;
    let response = app
        .request(
            "POST",
            "/api/rooms/dead2345/presence",
            Some(json!({ "endpointId": "ph-dead2345-x" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(response.error_code(), "EXPIRED");

    // Deactivated room.
    let room_id = app.create_room().await;
    app.state
        .rooms
        .deactivate(&RoomId::from(room_id.as_str()))
        .await
        .unwrap();
    let response = app
        .request(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(json!({ "endpointId": format!("ph-{room_id}-x") })),
        )
        .await;
    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(response.error_code(), "INACTIVE");
}

#[tokio::test]
async fn refreshing_participant_skips_the_room_check() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

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

    // The room dies, but a refresh of an existing record still lands;
    // the record will expire on its own.
    app.state
        .rooms
        .deactivate(&RoomId::from(room_id.as_str()))
        .await
        .unwrap();

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

#[tokio::test]
async fn malformed_announce_is_a_validation_error() {
    let app = TestApp::new().await;
    let room_id = app.create_room().await;

    let response = app
        .request(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(json!({ "endpointId": "" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn rooms_do_not_leak_presence_into_each_other() {
    let app = TestApp::new().await;
    let room_a = app.create_room().await;
    let room_b = app.create_room().await;

    app.request(
        "POST",
        &format!("/api/rooms/{room_a}/presence"),
        Some(json!({
            "participantId": "p-1",
            "endpointId": format!("ph-{room_a}-p-1"),
        })),
    )
    .await;

    let list = app
        .request("GET", &format!("/api/rooms/{room_b}/presence"), None)
        .await;
    assert!(list.body["participants"].as_array().unwrap().is_empty());
}
