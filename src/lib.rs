//! # Transform relay
//!
//! An HTTP service that receives batches of JSON entities and, for each
//! entity in order, calls a configurable downstream endpoint. The result is
//! either written back onto the entity (`/transform`) or discarded (`/sink`),
//! and the processed batch is returned as a JSON array, optionally streamed.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`server`] - Inbound HTTP routes
//! - [`core`] - Per-entity pipeline (resolve, execute, outcome, stream)
//! - [`adapters`] - Outbound sessions and URL templating
//! - [`domain`] - Entity, result and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use transform_relay::adapters::session::build_session_provider;
//! use transform_relay::config::RelayConfig;
//! use transform_relay::core::stream::Pipeline;
//! use transform_relay::server::build_router;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RelayConfig::with_url("https://api.example.com/items/{{ _id }}");
//!     let sessions = build_session_provider(&config)?;
//!     let pipeline = Arc::new(Pipeline::new(&config, sessions)?);
//!
//!     let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
//!     axum::serve(listener, build_router(pipeline)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], whose error type
//! [`domain::RelayError`] knows the HTTP status and JSON body it maps to.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod server;
