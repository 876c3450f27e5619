//! CLI command definitions.
//!
//! This module defines the command structure for the relay CLI and the
//! settings shared by every subcommand.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use relay_chat::{Mode, RelayConfig, RelayRouter};

pub mod models;
pub mod send;
pub mod serve;
pub mod state;

/// chat-relay - route chat messages to a local or remote AI backend
#[derive(Parser)]
#[command(name = "relay")]
#[command(version, about = "chat-relay - route chat messages to a local or remote AI backend")]
#[command(long_about = r#"
chat-relay forwards chat messages to one of two backends: a local executable
run once per message, or a remote chat-completion API. Send "switch AI" to
flip between them. In remote mode, "reset" starts a new conversation and
"switch model" lists the selectable models.

COMMANDS:
  serve   → Relay messages read line by line from stdin, in order
  send    → Relay a single message and print the reply
  state   → Show the persisted session state
  models  → List the selectable models

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Relay messages from stdin until EOF or Ctrl-C
    ///
    /// Lines are handled one at a time in input order; each reply is
    /// printed before the next line is read.
    Serve(serve::ServeArgs),

    /// Relay one message and print the reply
    Send(send::SendArgs),

    /// Show the persisted session state
    State(state::StateArgs),

    /// List the selectable models
    Models,
}

/// Configuration sources shared by all commands. Flags win over the file.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (TOML); missing file means defaults
    #[arg(long, global = true, env = "RELAY_CONFIG", default_value = "relay.toml")]
    pub config: PathBuf,

    /// Session state file
    #[arg(long, global = true, env = "RELAY_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Remote chat-completion endpoint
    #[arg(long, global = true, env = "RELAY_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Bearer token for the remote endpoint
    #[arg(long, global = true, env = "RELAY_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Local executable answering chat in local mode
    #[arg(long, global = true, env = "RELAY_LOCAL_PROGRAM")]
    pub program: Option<PathBuf>,

    /// Working directory for the local executable
    #[arg(long, global = true, env = "RELAY_LOCAL_WORKDIR")]
    pub local_workdir: Option<PathBuf>,

    /// Seconds before the local executable is killed
    #[arg(long, global = true, env = "RELAY_LOCAL_TIMEOUT")]
    pub local_timeout: Option<u64>,
}

impl GlobalArgs {
    /// Load the configuration file and apply flag overrides.
    pub fn load_config(&self) -> Result<RelayConfig> {
        let config = RelayConfig::load(&self.config).with_context(|| {
            format!("Failed to load configuration from {}", self.config.display())
        })?;
        Ok(self.apply_overrides(config))
    }

    fn apply_overrides(&self, mut config: RelayConfig) -> RelayConfig {
        if let Some(path) = &self.state_file {
            config.state_file = path.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.remote.endpoint = endpoint.clone();
        }
        if let Some(token) = &self.auth_token {
            config.remote.auth_token = token.clone();
        }
        if let Some(program) = &self.program {
            config.local.program = program.clone();
        }
        if let Some(dir) = &self.local_workdir {
            config.local.workdir = Some(dir.clone());
        }
        if let Some(secs) = self.local_timeout {
            config.local.timeout_secs = secs;
        }
        config
    }

    /// Build a router wired to the configured store and backends.
    pub fn build_router(&self, mode: Mode) -> Result<RelayRouter> {
        let config = self.load_config()?;

        let router = RelayRouter::new(
            Arc::new(config.session_store()),
            Arc::new(config.local_backend()),
            Arc::new(config.remote_backend()),
        )
        .with_context(|| {
            format!(
                "Failed to load session state from {}",
                config.state_file.display()
            )
        })?;

        Ok(router.with_mode(mode))
    }
}

/// Starting mode from a `--remote` flag.
pub fn start_mode(remote: bool) -> Mode {
    if remote {
        Mode::Remote
    } else {
        Mode::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("relay.toml");
        std::fs::write(
            &config_path,
            "[remote]\nendpoint = \"http://file.test/v1\"\nauth_token = \"from-file\"\n",
        )
        .unwrap();

        let cli = parse(&[
            "relay",
            "--config",
            config_path.to_str().unwrap(),
            "--endpoint",
            "http://flag.test/v1",
            "--local-timeout",
            "5",
            "--local-workdir",
            "/srv/bot",
            "models",
        ]);
        let config = cli.global.load_config().unwrap();
        assert_eq!(config.local.workdir, Some(PathBuf::from("/srv/bot")));

        assert_eq!(config.remote.endpoint, "http://flag.test/v1");
        assert_eq!(config.remote.auth_token, "from-file");
        assert_eq!(config.local.timeout_secs, 5);
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("relay.toml");
        std::fs::write(&config_path, "state_file = [").unwrap();

        let cli = parse(&["relay", "--config", config_path.to_str().unwrap(), "models"]);
        let err = cli.global.load_config().unwrap_err();

        assert!(err.to_string().contains("configuration"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["relay", "state", "--state-file", "/tmp/s.json", "--json"]);
        assert_eq!(cli.global.state_file, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn test_start_mode() {
        assert_eq!(start_mode(false), Mode::Local);
        assert_eq!(start_mode(true), Mode::Remote);
    }
}
