//! # relay_runner
//!
//! Local process execution for chat-relay.
//!
//! The local backend answers a chat message by running an executable once per
//! message, passing the text as the final argument and reading the reply from
//! standard output.
//!
//! # Features
//!
//! - **Output Capture**: stdout and stderr collected on reader threads
//! - **Timeouts**: the child is killed once the configured deadline passes
//! - **Argument Prefixes**: wrap the message in an interpreter invocation
//!
//! # Example
//!
//! ```rust,no_run
//! use relay_runner::{ProcessConfig, ProcessRunner};
//! use std::time::Duration;
//!
//! let runner = ProcessRunner::new(
//!     ProcessConfig::new("./xy").timeout(Duration::from_secs(60)),
//! );
//!
//! let result = runner.execute("hello").unwrap();
//! println!("Exit code: {}", result.exit_code);
//! ```

pub mod config;
pub mod error;
pub mod runner;

pub use config::{ProcessConfig, DEFAULT_PROGRAM, DEFAULT_TIMEOUT_SECS};
pub use error::{RunnerError, RunnerResult};
pub use runner::{ExecutionResult, ProcessRunner};
