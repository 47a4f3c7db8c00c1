//! Liveness endpoints for the hosting platform.

use std::future::Future;

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info};

pub const STATUS_DATA: &str = "Pathe is Up!";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusBody {
    pub status: &'static str,
    pub data: &'static str,
}

async fn monitor() -> Json<StatusBody> {
    Json(StatusBody {
        status: "running",
        data: STATUS_DATA,
    })
}

async fn health() -> Json<StatusBody> {
    Json(StatusBody {
        status: "healthy",
        data: STATUS_DATA,
    })
}

pub fn health_router() -> Router {
    Router::new()
        .route("/monitor", get(monitor))
        .route("/health", get(health))
}

/// Serves [`health_router`] on `listener` until `shutdown` completes.
pub async fn serve_health<F>(listener: TcpListener, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Health server listening");
    }
    axum::serve(listener, health_router())
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Health server stopped");
    Ok(())
}

/// Completes on SIGINT or SIGTERM. A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
