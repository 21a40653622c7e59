//! Inbound HTTP surface
//!
//! - `POST /transform` - call the endpoint per entity, write results back
//! - `POST /sink` - call the endpoint per entity, return entities unchanged
//! - `GET /health` - liveness probe
//!
//! Both batch endpoints accept a JSON array body and the optional query
//! parameters `service_config_property` and `path`.

pub mod handlers;

use crate::core::stream::Pipeline;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Builds the router over a shared pipeline
pub fn build_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/transform", post(handlers::transform))
        .route("/sink", post(handlers::sink))
        .route("/health", get(handlers::health))
        .with_state(pipeline)
}

/// Resolves when the process receives SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT (Ctrl+C), shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
