use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::io;
use tracing::info;
use utoipa::ToSchema;

/// Starts the Axum server with graceful shutdown.
///
/// # Errors
/// Returns an error if the TCP listener fails to bind to `address` or the
/// server encounters an error during operation.
pub async fn create_app(router: Router, address: &str) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    Ok(())
}

/// Completes on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Liveness response served at `/health`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub name: String,
    pub version: String,
    pub status: String,
}

/// Router serving the `/health` liveness endpoint.
pub fn health_router(name: &str, version: &str) -> Router {
    let response = HealthResponse {
        name: name.to_string(),
        version: version.to_string(),
        status: "ok".to_string(),
    };

    Router::new().route(
        "/health",
        get(move || {
            let response = response.clone();
            async move { Json(response) }
        }),
    )
}
