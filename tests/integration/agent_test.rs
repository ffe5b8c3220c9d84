//! End-to-end: presence agent against a live rendezvous server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use peerhub_agent::{
    AgentState, IncomingCall, LocalMedia, PeerTransport, PresenceAgent, SessionController,
    SessionHandle,
};
use peerhub_core::config::agent::AgentConfig;
use peerhub_core::error::ErrorKind;
use peerhub_core::result::AppResult;
use peerhub_core::types::{EndpointId, ParticipantId, RoomId};

use crate::helpers::TestApp;

#[derive(Default)]
struct MockTransport {
    calls: AtomicU32,
    controllers: Mutex<Vec<SessionController>>,
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn acquire_media(&self) -> AppResult<LocalMedia> {
        Ok(LocalMedia::new())
    }

    async fn call(&self, _endpoint: &EndpointId, _media: &LocalMedia) -> AppResult<SessionHandle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (handle, controller) = SessionHandle::channel();
        self.controllers.lock().await.push(controller);
        Ok(handle)
    }

    async fn next_incoming(&self) -> Option<IncomingCall> {
        std::future::pending().await
    }

    async fn release_media(&self, _media: LocalMedia) {}
}

/// Serve the test app's router on an ephemeral port.
async fn spawn_server(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Test server failed");
    });
    format!("http://{addr}")
}

fn agent_config(base_url: String) -> AgentConfig {
    AgentConfig {
        base_url,
        announce_interval_seconds: 60,
        poll_interval_seconds: 1,
        max_recovery_attempts: 1,
        identity_dir: std::env::temp_dir()
            .join(format!("peerhub-agent-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
        request_timeout_seconds: 5,
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn agent_joins_discovers_a_peer_and_leaves() {
    let app = TestApp::new().await;
    let base_url = spawn_server(&app).await;
    let room_id = app.create_room().await;

    let transport = Arc::new(MockTransport::default());
    let agent =
        PresenceAgent::new(agent_config(base_url), Arc::clone(&transport) as _).unwrap();

    let participant_id = agent.join(RoomId::from(room_id.as_str())).await.unwrap();
    assert_eq!(agent.state(), AgentState::Steady);

    // The agent's own record is visible.
    let list = app
        .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
        .await;
    let participants = list.body["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["participantId"], participant_id.as_str());

    // A second participant appears; the next poll should dial them.
    let response = app
        .request(
            "POST",
            &format!("/api/rooms/{room_id}/presence"),
            Some(json!({
                "participantId": "p-2",
                "endpointId": format!("ph-{room_id}-p-2"),
            })),
        )
        .await;
    assert_eq!(response.status, http::StatusCode::OK);

    let peer = ParticipantId::from("p-2");
    {
        let agent = &agent;
        let peer = peer.clone();
        wait_until(move || agent.orchestrator().contains(&peer)).await;
    }
    assert!(transport.calls.load(Ordering::SeqCst) >= 1);

    agent.leave().await.unwrap();
    assert_eq!(agent.state(), AgentState::Disconnected);
    assert!(agent.orchestrator().peers().is_empty());

    // The best-effort removal lands shortly after.
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let list = app
                .request("GET", &format!("/api/rooms/{room_id}/presence"), None)
                .await;
            let present = list.body["participants"]
                .as_array()
                .unwrap()
                .iter()
                .any(|p| p["participantId"] == participant_id.as_str());
            if !present {
                break;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .expect("presence record not removed after leave");
}

#[tokio::test]
async fn joining_a_missing_room_fails_immediately() {
    let app = TestApp::new().await;
    let base_url = spawn_server(&app).await;

    let agent =
        PresenceAgent::new(agent_config(base_url), Arc::new(MockTransport::default())).unwrap();

    let err = agent.join(RoomId::from("zzzzzzzz")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(agent.state(), AgentState::Disconnected);
}

#[tokio::test]
async fn leaving_forgets_the_identity() {
    let app = TestApp::new().await;
    let base_url = spawn_server(&app).await;
    let room_id = app.create_room().await;

    let agent =
        PresenceAgent::new(agent_config(base_url), Arc::new(MockTransport::default())).unwrap();

    let first = agent.join(RoomId::from(room_id.as_str())).await.unwrap();
    agent.leave().await.unwrap();
    let second = agent.join(RoomId::from(room_id.as_str())).await.unwrap();

    assert_ne!(first, second, "explicit leave must clear the identity");
    agent.leave().await.unwrap();
}
