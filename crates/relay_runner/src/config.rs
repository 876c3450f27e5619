//! Process configuration types.

use std::path::PathBuf;
use std::time::Duration;

/// Executable invoked when no program is configured, relative to the
/// working directory.
pub const DEFAULT_PROGRAM: &str = "./xy";

/// Seconds a local process may run before it is killed.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for a single local executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments placed before the message
    pub args: Vec<String>,
    /// Working directory for the child (inherits ours when unset)
    pub workdir: Option<PathBuf>,
    /// Deadline for the whole run, output included
    pub timeout: Duration,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl ProcessConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            workdir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program name as shown in logs and errors.
    pub fn display_program(&self) -> String {
        self.program.display().to_string()
    }
}
