//! Validate config command implementation
//!
//! Loads the configuration exactly as `serve` would (file, then environment
//! overrides) and prints a summary without opening any connections.

use crate::config::{load_config, RelayConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!(config_path = ?config_path, "Validating configuration");

        match config_path {
            Some(path) => println!("🔍 Validating configuration file: {path}"),
            None => println!("🔍 Validating configuration from environment"),
        }
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2) // Configuration error exit code
            }
        }
    }
}

fn print_summary(config: &RelayConfig) {
    let endpoint = &config.endpoint;
    println!("Configuration Summary:");
    println!("  URL Template: {}", endpoint.url);
    println!("  Method: {}", endpoint.method);
    println!("  Result Property: {}", endpoint.property);
    println!("  Payload Property: {}", endpoint.payload_property);
    println!(
        "  Service Config Property: {}",
        endpoint.service_config_property
    );
    println!(
        "  Tolerable Status Codes: {}",
        endpoint.tolerable_status_codes.as_deref().unwrap_or("(none)")
    );
    println!("  Streaming: {}", endpoint.do_stream);
    println!("  TLS Verification: {}", endpoint.tls_verify);
    println!(
        "  Authorization: {}",
        match config.authorization {
            Some(ref auth) if auth.is_oauth2() => "oauth2",
            Some(ref auth) if auth.basic.is_some() => "basic",
            _ => "none",
        }
    );
    println!("  Listen Address: {}", config.server.bind_address());
    println!("  Log Level: {}", config.logging.level);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs {};
        let _ = format!("{args:?}");
    }

    #[tokio::test]
    async fn test_validate_missing_file_returns_config_exit_code() {
        let args = ValidateArgs {};
        let code = args
            .execute(Some("/nonexistent/relay.toml"))
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
