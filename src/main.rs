//! PeerHub server — room presence and rendezvous service.
//!
//! Entry point that wires the crates together and starts the HTTP
//! server and the expired-room sweep.

mod sweeper;

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use peerhub_api::AppState;
use peerhub_cache::CacheManager;
use peerhub_core::config::AppConfig;
use peerhub_core::result::AppResult;
use peerhub_core::traits::RoomStore;
use peerhub_registry::{DatabasePool, PgRoomStore, RoomService};

#[tokio::main]
async fn main() {
    let env = std::env::var("PEERHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting PeerHub v{}", env!("CARGO_PKG_VERSION"));

    // Durable room storage + migrations.
    let db = DatabasePool::connect(&config.database).await?;
    peerhub_registry::migration::run_migrations(db.pool()).await?;

    // Presence cache.
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // Room registry.
    let store: Arc<dyn RoomStore> = Arc::new(PgRoomStore::new(db.pool().clone()));
    let rooms = Arc::new(RoomService::new(store, config.registry.clone()));

    let state = AppState::new(
        Arc::new(config.clone()),
        Arc::clone(&cache),
        Arc::clone(&rooms),
    );

    let mut scheduler =
        sweeper::start(rooms, Arc::clone(&state.presence), &config.registry).await?;

    peerhub_api::app::serve(state).await?;

    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Scheduler shutdown failed: {e}");
    }
    db.close().await;

    tracing::info!("PeerHub shut down gracefully");
    Ok(())
}
