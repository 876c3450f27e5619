//! chat-relay CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod console;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(&cli.global, args).await,
        Commands::Send(args) => commands::send::execute(&cli.global, args).await,
        Commands::State(args) => commands::state::execute(&cli.global, args).await,
        Commands::Models => commands::models::execute().await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr so replies on stdout stay clean.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "relay=debug,relay_chat=debug,relay_runner=debug"
    } else if quiet {
        "warn"
    } else {
        "relay=info,relay_chat=info,relay_runner=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    let msg = e.to_string().to_lowercase();

    if msg.contains("configuration") || msg.contains("argument") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_error() {
        let config_err = anyhow::anyhow!("Configuration error: relay.toml: bad value");
        assert_eq!(categorize_error(&config_err), ExitCodes::INVALID_ARGS);

        let other = anyhow::anyhow!("Transport error: stdout closed");
        assert_eq!(categorize_error(&other), ExitCodes::GENERAL_ERROR);
    }
}
