use clap::Parser;
use std::process;
use transform_relay::cli::commands::serve::ServeArgs;
use transform_relay::cli::{Cli, Commands};
use transform_relay::config::LoggingConfig;
use transform_relay::logging::init_logging;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            5 // Fatal error exit code
        }
    };

    process::exit(exit_code);
}

async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    let config_path = cli.config.as_deref();
    let log_level = cli.log_level.as_deref();

    match &cli.command {
        Some(Commands::Serve(args)) => args.execute(config_path, log_level).await,
        Some(Commands::ValidateConfig(args)) => {
            // Console only; validation never writes log files
            let _guard = init_logging(log_level.unwrap_or("warn"), &LoggingConfig::default())?;
            args.execute(config_path).await
        }
        None => ServeArgs::default().execute(config_path, log_level).await,
    }
}
