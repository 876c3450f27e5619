//! Relay configuration.
//!
//! Read from an optional TOML file; every field has a default so an empty or
//! missing file is a valid configuration.
//!
//! ```toml
//! state_file = "conversation_history.json"
//!
//! [local]
//! program = "./xy"
//! args = []
//! # workdir = "/opt/xy"
//! timeout_secs = 60
//!
//! [remote]
//! endpoint = "http://127.0.0.1:8000/v1/chat/completions"
//! auth_token = ""
//! timeout_secs = 120
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use relay_runner::{ProcessConfig, DEFAULT_PROGRAM, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::LocalProcessBackend;
use crate::error::{ChatError, ChatResult};
use crate::llm::{RemoteChatAdapter, DEFAULT_ENDPOINT, DEFAULT_REMOTE_TIMEOUT_SECS};
use crate::persistence::{JsonFileStore, DEFAULT_STATE_FILE};

/// Top-level relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    /// Where the session record lives
    pub state_file: PathBuf,
    /// Local executable backend
    pub local: LocalSettings,
    /// Remote chat-completion backend
    pub remote: RemoteSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocalSettings {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory for the program; a relative `program` resolves
    /// against it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteSettings {
    pub endpoint: String,
    pub auth_token: String,
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            local: LocalSettings::default(),
            remote: RemoteSettings::default(),
        }
    }
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            args: Vec::new(),
            workdir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth_token: String::new(),
            timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
        }
    }
}

impl RelayConfig {
    /// Load from `path`. A missing file yields the defaults; a file that
    /// exists but does not parse is an error.
    pub fn load(path: impl AsRef<Path>) -> ChatResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loading configuration from {}", path.display());
                toml::from_str(&content).map_err(|e| {
                    ChatError::ConfigError(format!("{}: {}", path.display(), e))
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ChatError::IoError(e)),
        }
    }

    pub fn from_toml_str(content: &str) -> ChatResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Process settings for the local backend.
    pub fn process_config(&self) -> ProcessConfig {
        let config = ProcessConfig::new(&self.local.program)
            .args(self.local.args.clone())
            .timeout(Duration::from_secs(self.local.timeout_secs));
        match &self.local.workdir {
            Some(dir) => config.workdir(dir),
            None => config,
        }
    }

    pub fn local_backend(&self) -> LocalProcessBackend {
        LocalProcessBackend::new(self.process_config())
    }

    pub fn remote_backend(&self) -> RemoteChatAdapter {
        RemoteChatAdapter::new(&self.remote.endpoint, &self.remote.auth_token)
            .with_timeout(Duration::from_secs(self.remote.timeout_secs))
    }

    pub fn session_store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.state_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = RelayConfig::from_toml_str("").unwrap();
        assert_eq!(config, RelayConfig::default());
        assert_eq!(config.state_file, PathBuf::from("conversation_history.json"));
        assert_eq!(config.local.timeout_secs, 60);
    }

    #[test]
    fn test_partial_config() {
        let config = RelayConfig::from_toml_str(
            r#"
            [remote]
            endpoint = "http://example.test/v1/chat/completions"
            auth_token = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.remote.endpoint, "http://example.test/v1/chat/completions");
        assert_eq!(config.remote.auth_token, "secret");
        assert_eq!(config.remote.timeout_secs, 120);
        assert_eq!(config.local, LocalSettings::default());
    }

    #[test]
    fn test_invalid_config() {
        let err = RelayConfig::from_toml_str("[local]\ntimeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ChatError::ConfigError(_)));
    }

    #[test]
    fn test_process_config_mapping() {
        let mut config = RelayConfig::default();
        config.local.program = PathBuf::from("/usr/bin/env");
        config.local.args = vec!["python3".to_string(), "bot.py".to_string()];
        config.local.timeout_secs = 5;

        let process = config.process_config();
        assert_eq!(process.program, PathBuf::from("/usr/bin/env"));
        assert_eq!(process.args.len(), 2);
        assert_eq!(process.timeout, Duration::from_secs(5));
        assert!(process.workdir.is_none());

        config.local.workdir = Some(PathBuf::from("/opt/xy"));
        assert_eq!(
            config.process_config().workdir,
            Some(PathBuf::from("/opt/xy"))
        );
    }

    #[test]
    fn test_workdir_from_toml() {
        let config = RelayConfig::from_toml_str(
            r#"
            [local]
            program = "./xy"
            workdir = "/srv/bot"
            "#,
        )
        .unwrap();

        assert_eq!(config.local.workdir, Some(PathBuf::from("/srv/bot")));
        assert_eq!(
            config.local_backend().config().workdir,
            Some(PathBuf::from("/srv/bot"))
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = RelayConfig::load("/definitely/not/here/relay.toml").unwrap();
        assert_eq!(config, RelayConfig::default());
    }
}
