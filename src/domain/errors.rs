//! Domain error types
//!
//! This module defines the error hierarchy for the relay. All errors are
//! domain-specific and don't expose third-party types.

use serde_json::Value;
use thiserror::Error;

/// Main relay error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// URL template could not be parsed or rendered
    #[error("Render error: {0}")]
    Render(String),

    /// Authentication errors (token fetch, invalid credentials)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The batch was aborted by an entity whose outcome was not acceptable.
    ///
    /// Carries the status code and body that become the HTTP response.
    #[error("Batch aborted with status {status_code}")]
    Aborted { status_code: u16, body: Value },

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl RelayError {
    /// Status code this error is reported with on the HTTP surface
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Aborted { status_code, .. } => *status_code,
            _ => 500,
        }
    }

    /// JSON body this error is reported with on the HTTP surface
    ///
    /// Aborts report the triggering entity's return value unchanged; every
    /// other error uses the same failure shape as a transport failure.
    pub fn body(&self) -> Value {
        match self {
            RelayError::Aborted { body, .. } => body.clone(),
            other => failure_body(&other.to_string(), 500),
        }
    }
}

/// Builds the `{transform_succeeded, message, status_code}` failure payload
pub fn failure_body(message: &str, status_code: u16) -> Value {
    serde_json::json!({
        "transform_succeeded": false,
        "message": message,
        "status_code": status_code,
    })
}

// Conversion from std::io::Error
impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for RelayError {
    fn from(err: toml::de::Error) -> Self {
        RelayError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from template engine errors
impl From<minijinja::Error> for RelayError {
    fn from(err: minijinja::Error) -> Self {
        RelayError::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_display() {
        let err = RelayError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_aborted_reports_its_own_status_and_body() {
        let body = serde_json::json!({"message": "not found"});
        let err = RelayError::Aborted {
            status_code: 404,
            body: body.clone(),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.body(), body);
    }

    #[test]
    fn test_other_errors_report_500_failure_shape() {
        let err = RelayError::Authentication("token endpoint unreachable".to_string());
        assert_eq!(err.status_code(), 500);

        let body = err.body();
        assert_eq!(body["transform_succeeded"], false);
        assert_eq!(body["status_code"], 500);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("token endpoint unreachable"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: RelayError = io_err.into();
        assert!(matches!(err, RelayError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: RelayError = json_err.into();
        assert!(matches!(err, RelayError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: RelayError = toml_err.into();
        assert!(matches!(err, RelayError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_template_error_conversion() {
        let env = minijinja::Environment::new();
        let tmpl_err = env.template_from_str("{{ unclosed").unwrap_err();
        let err: RelayError = tmpl_err.into();
        assert!(matches!(err, RelayError::Render(_)));
    }
}
