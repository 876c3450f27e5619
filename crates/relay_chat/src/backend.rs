//! Backend ports and the local process adapter.
//!
//! Both backends are synchronous and infallible from the caller's point of
//! view: every failure is folded into the reply text. The router runs them
//! on the blocking pool.

use relay_runner::{ProcessConfig, ProcessRunner, RunnerError};
use tracing::{error, info};

/// Reply when the local executable runs past its deadline.
pub const LOCAL_TIMEOUT_REPLY: &str = "Request timed out, please try again later.";

/// Answers chat text by some local means.
pub trait LocalBackend: Send + Sync {
    fn run(&self, message: &str) -> String;
}

/// Reply from the remote backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReply {
    /// Text shown to the user
    pub text: String,
    /// Conversation id to continue with, if the backend returned one
    pub conversation_id: Option<String>,
}

impl RemoteReply {
    pub fn new(text: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            text: text.into(),
            conversation_id,
        }
    }

    /// A reply that carries no conversation id.
    pub fn failure(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }
}

/// Answers chat text through a remote chat-completion service.
pub trait RemoteBackend: Send + Sync {
    fn run(&self, message: &str, model: &str, conversation_id: Option<&str>) -> RemoteReply;
}

/// Local backend that runs an executable once per message.
#[derive(Debug, Clone)]
pub struct LocalProcessBackend {
    runner: ProcessRunner,
}

impl LocalProcessBackend {
    pub fn new(config: ProcessConfig) -> Self {
        Self {
            runner: ProcessRunner::new(config),
        }
    }

    pub fn config(&self) -> &ProcessConfig {
        self.runner.config()
    }
}

impl LocalBackend for LocalProcessBackend {
    fn run(&self, message: &str) -> String {
        info!("Running {} for message", self.config().display_program());

        match self.runner.execute(message) {
            Ok(result) if result.success() => {
                let reply = result.stdout.trim().to_string();
                info!("Local reply after {}ms: {}", result.duration_ms, reply);
                reply
            }
            Ok(result) => {
                error!(
                    "Local process exited with {}: {}",
                    result.exit_code,
                    result.stderr.trim()
                );
                format!("Error: {}", result.stderr.trim())
            }
            Err(RunnerError::Timeout(secs)) => {
                error!("Local process timed out after {}s", secs);
                LOCAL_TIMEOUT_REPLY.to_string()
            }
            Err(e) => {
                error!("Unexpected error running local process: {}", e);
                format!("Unexpected error: {}", e)
            }
        }
    }
}
