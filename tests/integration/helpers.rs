//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use peerhub_api::AppState;
use peerhub_api::router::build_router;
use peerhub_cache::CacheManager;
use peerhub_core::config::{AppConfig, DatabaseConfig};
use peerhub_core::traits::RoomStore;
use peerhub_core::types::Room;
use peerhub_registry::RoomService;
use peerhub_registry::memory::InMemoryRoomStore;

/// Test application context.
///
/// Runs the real router over the in-memory room store and cache, so
/// tests need neither PostgreSQL nor Redis.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
    /// Application state, for direct service access.
    pub state: AppState,
    /// The backing room store, for seeding rooms in unusual states.
    pub store: Arc<InMemoryRoomStore>,
}

/// A config that never touches external services.
pub fn test_config() -> AppConfig {
    AppConfig {
        server: Default::default(),
        database: DatabaseConfig {
            url: "postgres://unused-in-tests".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
        },
        cache: Default::default(),
        registry: Default::default(),
        presence: Default::default(),
        rate_limit: Default::default(),
        agent: Default::default(),
        logging: Default::default(),
    }
}

impl TestApp {
    /// Create a test application with default configuration.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with a custom configuration.
    pub async fn with_config(config: AppConfig) -> Self {
        let cache = Arc::new(
            CacheManager::new(&config.cache)
                .await
                .expect("Failed to init cache"),
        );
        let store = Arc::new(InMemoryRoomStore::new());
        let rooms = Arc::new(RoomService::new(
            Arc::clone(&store) as Arc<dyn RoomStore>,
            config.registry.clone(),
        ));
        let state = AppState::new(Arc::new(config), cache, rooms);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            store,
        }
    }

    /// Seed a room directly into the store, bypassing the service.
    pub async fn seed_room(&self, room: Room) {
        assert!(
            self.store.insert(&room).await.expect("Failed to seed room"),
            "seed collided with an existing room id"
        );
    }

    /// Create a room through the API and return its id.
    pub async fn create_room(&self) -> String {
        let response = self.request("POST", "/api/rooms", None).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["roomId"]
            .as_str()
            .expect("No roomId in response")
            .to_string()
    }

    /// Make an HTTP request to the test app.
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        self.request_from(method, path, body, "10.0.0.1").await
    }

    /// Make an HTTP request with a specific client address (via the
    /// forwarding header the rate limiter keys on).
    pub async fn request_from(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        client_ip: &str,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", client_ip)
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Parsed JSON body.
    pub body: Value,
}

impl TestResponse {
    /// The machine-readable error code, for error responses.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or("")
    }
}
