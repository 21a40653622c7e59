//! Configuration loader with TOML parsing and environment variable overrides
//!
//! The relay can be configured entirely from the environment (the way it is
//! usually deployed as a container) or from a TOML file whose values the
//! environment then overrides.

use super::schema::{AuthorizationConfig, RelayConfig};
use crate::domain::errors::RelayError;
use crate::domain::result::Result;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Loads configuration from an optional TOML file plus the environment
///
/// This function:
/// 1. Reads the TOML file, if one is given
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into RelayConfig (or starts from defaults)
/// 4. Applies environment variable overrides (`URL`, `METHOD`, `HEADERS`, ...)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - An override holds malformed JSON or an unparseable number
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use transform_relay::config::loader::load_config;
///
/// let config = load_config(Some("relay.toml")).expect("Failed to load config");
/// ```
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<RelayConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path.as_ref())?,
        None => RelayConfig::with_url(String::new()),
    };

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        RelayError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<RelayConfig> {
    if !path.exists() {
        return Err(RelayError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RelayError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    toml::from_str(&contents)
        .map_err(|e| RelayError::Configuration(format!("Failed to parse TOML: {e}")))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| RelayError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        // Skip comment lines - don't process env vars in comments
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RelayError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies the environment variables the relay has always been configured with
fn apply_env_overrides(config: &mut RelayConfig) -> Result<()> {
    let endpoint = &mut config.endpoint;

    if let Ok(val) = std::env::var("URL") {
        endpoint.url = val;
    }
    if let Ok(val) = std::env::var("METHOD") {
        endpoint.method = val;
    }
    if let Ok(val) = std::env::var("PROPERTY") {
        endpoint.property = val;
    }
    if let Ok(val) = std::env::var("PAYLOAD_PROPERTY") {
        endpoint.payload_property = val;
    }
    if let Ok(val) = std::env::var("HEADERS") {
        endpoint.headers = serde_json::from_str::<BTreeMap<String, String>>(&val).map_err(|e| {
            RelayError::Configuration(format!("HEADERS must be a JSON object of strings: {e}"))
        })?;
    }
    if let Ok(val) = std::env::var("TOLERABLE_STATUS_CODES") {
        endpoint.tolerable_status_codes = if val.is_empty() { None } else { Some(val) };
    }
    if let Ok(val) = std::env::var("SERVICE_CONFIG_PROPERTY") {
        endpoint.service_config_property = val;
    }
    if let Ok(val) = std::env::var("DO_STREAM") {
        endpoint.do_stream = val.eq_ignore_ascii_case("true");
    }
    if let Ok(val) = std::env::var("DO_VERIFY_SSL") {
        endpoint.tls_verify = val.eq_ignore_ascii_case("true");
    }
    if let Ok(val) = std::env::var("TIMEOUT_SECONDS") {
        let seconds = val.parse().map_err(|e| {
            RelayError::Configuration(format!("TIMEOUT_SECONDS must be an integer: {e}"))
        })?;
        endpoint.timeout_seconds = Some(seconds);
    }

    endpoint.method = endpoint.method.to_uppercase();

    if let Ok(val) = std::env::var("AUTHORIZATION") {
        if !val.trim().is_empty() {
            let authorization: AuthorizationConfig = serde_json::from_str(&val).map_err(|e| {
                RelayError::Configuration(format!("AUTHORIZATION is not a valid descriptor: {e}"))
            })?;
            config.authorization = Some(authorization);
        }
    }

    if let Ok(val) = std::env::var("HOST") {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("PORT") {
        config.server.port = val
            .parse()
            .map_err(|e| RelayError::Configuration(format!("PORT must be a port number: {e}")))?;
    }

    if let Ok(val) = std::env::var("LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Ok(val) = std::env::var("LOG_LOCAL_ENABLED") {
        config.logging.local_enabled = val.eq_ignore_ascii_case("true");
    }
    if let Ok(val) = std::env::var("LOG_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("RELAY_LOADER_TEST_VAR", "test_value");
        let input = "client_secret = \"${RELAY_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "client_secret = \"test_value\"\n");
        std::env::remove_var("RELAY_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("RELAY_LOADER_MISSING_VAR");
        let input = "client_secret = \"${RELAY_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("RELAY_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("RELAY_LOADER_COMMENTED_VAR");
        let input = "# url = \"${RELAY_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some("nonexistent.toml"));
        assert!(result.is_err());
    }
}
