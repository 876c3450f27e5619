//! Process runner and execution results.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::ProcessConfig;
use crate::error::{RunnerError, RunnerResult};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a finished process.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Exit code (-1 when terminated by a signal)
    pub exit_code: i64,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Wall time until both output streams closed, in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs one configured executable per call.
///
/// The message is appended as the last argument, after any configured
/// prefix arguments, so `sh -c '<script>' sh` style wrappers receive it as
/// `$1`.
///
/// The deadline covers both the child's exit and the end of its output. A
/// child that exits while a background process keeps its pipes open still
/// times out.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    config: ProcessConfig,
}

impl ProcessRunner {
    pub fn new(config: ProcessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Build the argument list for a message.
    pub fn build_args(&self, message: &str) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.push(message.to_string());
        args
    }

    /// Run the executable with `message`, blocking until it exits and its
    /// output is drained, or the timeout expires.
    pub fn execute(&self, message: &str) -> RunnerResult<ExecutionResult> {
        let program = self.config.display_program();
        let mut cmd = Command::new(&self.config.program);
        cmd.args(self.build_args(message));
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        if let Some(dir) = &self.config.workdir {
            cmd.current_dir(dir);
        }

        debug!("Executing: {} ({} prefix args)", program, self.config.args.len());

        let start = Instant::now();
        let deadline = start + self.config.timeout;

        let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout_rx = spawn_reader(child.stdout.take());
        let stderr_rx = spawn_reader(child.stderr.take());

        let status = self.wait_with_timeout(&mut child, deadline)?;

        // Reader threads still blocked at the deadline are left detached.
        let stdout = self.collect(&stdout_rx, deadline)?;
        let stderr = self.collect(&stderr_rx, deadline)?;

        let exit_code = status.code().unwrap_or(-1) as i64;
        let duration_ms = start.elapsed().as_millis() as u64;
        debug!("{} exited with {} after {}ms", program, exit_code, duration_ms);

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            duration_ms,
        })
    }

    fn wait_with_timeout(&self, child: &mut Child, deadline: Instant) -> RunnerResult<ExitStatus> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!(
                            "{} exceeded {}s, killing",
                            self.config.display_program(),
                            self.config.timeout.as_secs()
                        );
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(self.timeout_error());
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(RunnerError::Wait(e.to_string())),
            }
        }
    }

    fn collect(&self, rx: &Receiver<String>, deadline: Instant) -> RunnerResult<String> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(output) => Ok(output),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "{} exited but its output stayed open past {}s",
                    self.config.display_program(),
                    self.config.timeout.as_secs()
                );
                Err(self.timeout_error())
            }
            Err(RecvTimeoutError::Disconnected) => Ok(String::new()),
        }
    }

    fn timeout_error(&self) -> RunnerError {
        RunnerError::Timeout(self.config.timeout.as_secs())
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut output = String::new();
        if let Some(mut pipe) = pipe {
            let mut bytes = Vec::new();
            if pipe.read_to_end(&mut bytes).is_ok() {
                output = String::from_utf8_lossy(&bytes).into_owned();
            }
        }
        let _ = tx.send(output);
    });
    rx
}
