use crate::error::GatewayError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Raw output of a process that ran to completion
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human-readable output for a successful run
    ///
    /// Prefers stdout, then stderr (git writes progress to stderr), then the
    /// supplied fallback message.
    pub fn display_output(&self, fallback: &str) -> String {
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }

        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }

        fallback.to_string()
    }
}

/// Why a process invocation failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    NonZeroExit,
    TimedOut(Duration),
    OutputLimitExceeded(usize),
    SpawnFailed(String),
    Host(String),
}

/// Details of a failed invocation, carried by `GatewayError::ExecutionFailed`
#[derive(Debug, Clone)]
pub struct ExitInfo {
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub kind: FailureKind,
}

impl ExitInfo {
    pub fn from_output(output: ProcessOutput) -> Self {
        Self {
            exit_code: output.exit_code,
            stderr: output.stderr,
            kind: FailureKind::NonZeroExit,
        }
    }

    pub fn timed_out(after: Duration) -> Self {
        Self::without_output(FailureKind::TimedOut(after))
    }

    pub fn output_limit(limit: usize) -> Self {
        Self::without_output(FailureKind::OutputLimitExceeded(limit))
    }

    pub fn spawn_failed(message: impl Into<String>) -> Self {
        Self::without_output(FailureKind::SpawnFailed(message.into()))
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::without_output(FailureKind::Host(message.into()))
    }

    /// Attach whatever stderr the process wrote before it was stopped
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    fn without_output(kind: FailureKind) -> Self {
        Self {
            exit_code: None,
            stderr: String::new(),
            kind,
        }
    }

    /// Text shown to the caller: stderr if there is any, else the description
    pub fn output(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.description()
        } else {
            stderr.to_string()
        }
    }

    pub fn description(&self) -> String {
        match &self.kind {
            FailureKind::NonZeroExit => match self.exit_code {
                Some(code) => format!("Command failed with exit code {}", code),
                None => "Command was terminated by a signal".to_string(),
            },
            FailureKind::TimedOut(after) => {
                format!("Command timed out after {} ms", after.as_millis())
            }
            FailureKind::OutputLimitExceeded(limit) => {
                format!("Command output exceeded the limit of {} bytes", limit)
            }
            FailureKind::SpawnFailed(message) => format!("Failed to start command: {}", message),
            FailureKind::Host(message) => format!("Server error: {}", message),
        }
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output())
    }
}

/// Normalized result handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
}

impl ExecutionResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

impl From<GatewayError> for ExecutionResult {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::ExecutionFailed(info) => ExecutionResult::failed(info.output()),
            GatewayError::InvalidInput(message) => ExecutionResult::failed(message),
            forbidden @ GatewayError::Forbidden { .. } => ExecutionResult::failed(forbidden.to_string()),
        }
    }
}
