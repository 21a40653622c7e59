//! Logging and observability
//!
//! Structured logging with `tracing`:
//! - Human-readable console output
//! - Optional JSON-formatted rolling log files
//! - Level from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use transform_relay::logging::init_logging;
//! use transform_relay::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(entity_id = "1", status_code = 200, "Received response");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
