//! Serve command implementation
//!
//! Wires configuration, logging, the session provider and the batch pipeline
//! into the HTTP server, then runs until SIGINT or SIGTERM.

use crate::adapters::session::build_session_provider;
use crate::config::load_config;
use crate::core::stream::Pipeline;
use crate::logging::init_logging;
use crate::server::{build_router, shutdown_signal};
use anyhow::Context;
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen port (overrides `server.port` and `PORT`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        log_level: Option<&str>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }

        let level = log_level.unwrap_or(&config.logging.level).to_string();
        let _guard = init_logging(&level, &config.logging)?;

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            url = %config.endpoint.url,
            method = %config.endpoint.method,
            do_stream = config.endpoint.do_stream,
            "Starting transform relay"
        );

        let sessions = build_session_provider(&config)?;

        // Fetch the first token eagerly so credential problems show up at boot.
        if config
            .authorization
            .as_ref()
            .is_some_and(|auth| auth.is_oauth2())
        {
            if let Err(e) = sessions.make_session().await {
                tracing::warn!(error = %e, "Initial token fetch failed, will retry per batch");
            }
        }

        let pipeline = Arc::new(Pipeline::new(&config, sessions)?);
        let router = build_router(pipeline);

        let address = config.server.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {address}"))?;

        tracing::info!(address = %address, "Listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        tracing::info!("Server stopped");
        Ok(0)
    }
}
