//! Configuration management for the relay.
//!
//! Configuration is read once at startup and is immutable afterwards.
//!
//! # Sources
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config`), with `${VAR_NAME}` substitution
//! 3. Environment variables, using the names deployments already set:
//!    `URL`, `METHOD`, `PROPERTY`, `PAYLOAD_PROPERTY`, `HEADERS`,
//!    `AUTHORIZATION`, `DO_STREAM`, `DO_VERIFY_SSL`, `TOLERABLE_STATUS_CODES`,
//!    `SERVICE_CONFIG_PROPERTY`, `TIMEOUT_SECONDS`, `HOST`, `PORT`, `LOG_LEVEL`
//!
//! # Example Configuration
//!
//! ```toml
//! [endpoint]
//! url = "https://api.example.com/items/{{ entity._id }}"
//! method = "POST"
//! property = "response"
//! headers = { "Content-Type" = "application/json" }
//! tolerable_status_codes = "404"
//!
//! [authorization]
//! type = "oauth2"
//!
//! [authorization.oauth2]
//! client_id = "relay"
//! client_secret = "${RELAY_CLIENT_SECRET}"
//! token_url = "https://auth.example.com/oauth/token"
//!
//! [server]
//! port = 5001
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use transform_relay::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None::<&str>)?;
//! println!("URL template: {}", config.endpoint.url);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    AuthorizationConfig, EndpointConfig, LoggingConfig, OAuth2Config, RelayConfig, ServerConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
