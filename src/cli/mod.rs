//! CLI interface and argument parsing
//!
//! Running the binary without a subcommand starts the server, which is how
//! the relay is usually launched inside a container.

pub mod commands;

use clap::{Parser, Subcommand};

/// Transform relay - per-entity HTTP transform service
#[derive(Parser, Debug)]
#[command(name = "transform-relay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, env = "RELAY_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(commands::serve::ServeArgs),

    /// Validate configuration and exit
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_defaults_to_no_command() {
        let cli = Cli::parse_from(["transform-relay"]);
        assert!(cli.command.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["transform-relay", "--config", "relay.toml", "serve"]);
        assert_eq!(cli.config.as_deref(), Some("relay.toml"));
        assert!(matches!(cli.command, Some(Commands::Serve(_))));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["transform-relay", "--log-level", "debug"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_serve_port() {
        let cli = Cli::parse_from(["transform-relay", "serve", "--port", "8080"]);
        match cli.command {
            Some(Commands::Serve(args)) => assert_eq!(args.port, Some(8080)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["transform-relay", "validate-config"]);
        assert!(matches!(cli.command, Some(Commands::ValidateConfig(_))));
    }
}
