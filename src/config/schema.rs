//! Configuration schema types
//!
//! This module defines the process-wide configuration structure. It is read
//! once at startup and shared immutably for the lifetime of the process.

use crate::config::SecretString;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main relay configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Default endpoint settings applied to every entity
    pub endpoint: EndpointConfig,

    /// Outbound authorization (absent = no auth)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AuthorizationConfig>,

    /// Inbound HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Creates a configuration with defaults for everything but the URL template
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            endpoint: EndpointConfig::with_url(url),
            authorization: None,
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.endpoint.validate()?;
        if let Some(ref authorization) = self.authorization {
            authorization.validate()?;
        }
        self.server.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Default per-entity endpoint settings
///
/// Each field can be overridden for an individual entity through its
/// service-config property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// URL template (Jinja syntax)
    pub url: String,

    /// HTTP method
    #[serde(default = "default_method")]
    pub method: String,

    /// Property the call result is written to
    #[serde(default = "default_property")]
    pub property: String,

    /// Property the request payload is read from
    #[serde(default = "default_payload_property")]
    pub payload_property: String,

    /// Headers sent with every call
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Regex matched against the status code text; matching non-ok
    /// statuses are recorded instead of aborting the batch
    #[serde(default)]
    pub tolerable_status_codes: Option<String>,

    /// Entity property holding the per-entity override object
    #[serde(default = "default_service_config_property")]
    pub service_config_property: String,

    /// Stream results as they are produced instead of buffering the batch
    #[serde(default = "default_true")]
    pub do_stream: bool,

    /// TLS certificate verification for outbound calls
    ///
    /// **SECURITY WARNING**: disabling verification exposes outbound calls to
    /// man-in-the-middle attacks. Default: `true`
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Outbound request timeout in seconds (absent = transport default)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl EndpointConfig {
    /// Creates endpoint settings with defaults for everything but the URL template
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            property: default_property(),
            payload_property: default_payload_property(),
            headers: BTreeMap::new(),
            tolerable_status_codes: None,
            service_config_property: default_service_config_property(),
            do_stream: true,
            tls_verify: true,
            timeout_seconds: None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("endpoint.url cannot be empty".to_string());
        }

        if reqwest::Method::from_bytes(self.method.as_bytes()).is_err() {
            return Err(format!("Invalid endpoint.method '{}'", self.method));
        }

        if self.property.is_empty() {
            return Err("endpoint.property cannot be empty".to_string());
        }

        if self.service_config_property.is_empty() {
            return Err("endpoint.service_config_property cannot be empty".to_string());
        }

        if let Some(ref pattern) = self.tolerable_status_codes {
            Regex::new(pattern).map_err(|e| {
                format!("Invalid endpoint.tolerable_status_codes '{pattern}': {e}")
            })?;
        }

        if self.timeout_seconds == Some(0) {
            return Err("endpoint.timeout_seconds must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Authorization descriptor
///
/// Mirrors the JSON accepted in the `AUTHORIZATION` environment variable:
/// `{"type": "oauth2", "oauth2": {...}}` or `{"type": "basic", "basic": [user, pass]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// `oauth2` selects the client-credentials flow; anything else is static
    #[serde(rename = "type", default)]
    pub auth_type: String,

    /// Client-credentials settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2: Option<OAuth2Config>,

    /// Basic credentials as `[user, password]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<(String, SecretString)>,
}

impl AuthorizationConfig {
    /// Whether this descriptor selects the OAuth2 strategy
    pub fn is_oauth2(&self) -> bool {
        self.auth_type.eq_ignore_ascii_case("oauth2")
    }

    fn validate(&self) -> Result<(), String> {
        if self.is_oauth2() {
            let oauth2 = self.oauth2.as_ref().ok_or_else(|| {
                "authorization.oauth2 is required when authorization.type is 'oauth2'".to_string()
            })?;
            oauth2.validate()?;
        } else if let Some((ref user, _)) = self.basic {
            if user.is_empty() {
                return Err("authorization.basic user cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

/// OAuth2 client-credentials settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// Client identifier
    pub client_id: String,

    /// Client secret
    /// Stored securely in memory and automatically zeroized on drop
    pub client_secret: SecretString,

    /// Token endpoint URL
    pub token_url: String,

    /// Requested scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Additional form parameters sent to the token endpoint (e.g. `audience`)
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl OAuth2Config {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.client_id.is_empty() {
            return Err("authorization.oauth2.client_id cannot be empty".to_string());
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err("authorization.oauth2.client_secret cannot be empty".to_string());
        }
        if !self.token_url.starts_with("http://") && !self.token_url.starts_with("https://") {
            return Err(
                "authorization.oauth2.token_url must start with http:// or https://".to_string(),
            );
        }
        Ok(())
    }
}

/// Inbound HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("server.host cannot be empty".to_string());
        }
        Ok(())
    }

    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            ));
        }

        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            );
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_property() -> String {
    "response".to_string()
}

fn default_payload_property() -> String {
    "payload".to_string()
}

fn default_service_config_property() -> String {
    "service_config".to_string()
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
