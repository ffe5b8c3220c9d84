//! HTTP server bootstrap: binds the listener and runs the router
//! until a shutdown signal arrives.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use peerhub_core::error::AppError;
use peerhub_core::result::AppResult;

use crate::router::build_router;
use crate::state::AppState;

/// Bind and serve the rendezvous API until Ctrl+C.
///
/// Uses `into_make_service_with_connect_info` so handlers can read the
/// peer address when no forwarding header is present.
pub async fn serve(state: AppState) -> AppResult<()> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Rendezvous API listening on {addr}");

    let app = build_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Rendezvous API shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {e}");
    }
}
