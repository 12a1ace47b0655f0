//! The execution gateway: validation, bounded execution and result
//! normalization for every process the service starts.

pub mod executor;
pub mod outcome;
pub mod request;

// Re-export commonly used types
pub use executor::{ExecutionLimits, Invocation, ProcessRunner, SystemRunner};
pub use outcome::{ExecutionResult, ExitInfo, FailureKind, ProcessOutput};
pub use request::{CommandMode, CommandRequest};

use crate::audit::{AuditLogger, AuditOutcome};
use crate::config::{Config, GitConfig};
use crate::error::{AppResult, GatewayError, Result};
use crate::git::{self, CommitEntry};
use crate::security::{CommandValidator, ValidationError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};

const SHELL_SUCCESS: &str = "Command executed successfully";
const COMMIT_SUCCESS: &str = "Commit created successfully";
const PUSH_SUCCESS: &str = "Push completed successfully";

/// Default number of requests allowed to run processes at the same time
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Validates and runs commands on behalf of the presentation layer
///
/// Holds no per-request state. Concurrent requests beyond
/// `max_concurrent` wait for a permit before spawning anything.
pub struct Gateway {
    validator: CommandValidator,
    runner: Arc<dyn ProcessRunner>,
    limits: ExecutionLimits,
    git: GitConfig,
    permits: Semaphore,
    max_concurrent: usize,
    audit: Option<AuditLogger>,
}

impl Gateway {
    /// Create a gateway with default limits around `runner`
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            validator: CommandValidator::new(),
            runner,
            limits: ExecutionLimits::default(),
            git: GitConfig::default(),
            permits: Semaphore::new(DEFAULT_MAX_CONCURRENT),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            audit: None,
        }
    }

    /// Build a gateway running real processes as described by `config`
    ///
    /// An invalid config is an error. An audit log that cannot be opened is
    /// not: the gateway starts without auditing and says so.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        config.validate()?;

        let mut runner = SystemRunner::new().with_shell(&config.execution.shell);
        if let Some(dir) = &config.execution.workdir {
            runner = runner.with_workdir(dir);
        }

        let mut gateway = Self::new(Arc::new(runner))
            .with_limits(config.execution.limits())
            .with_max_concurrent(config.execution.max_concurrent)
            .with_git(config.git.clone());

        if config.audit.enabled {
            match open_audit_log(config) {
                Ok(logger) => gateway = gateway.with_audit(logger),
                Err(e) => warn!("Audit log unavailable, continuing without it: {}", e),
            }
        }

        Ok(gateway)
    }

    /// Whether executions are being written to an audit log
    pub fn is_audited(&self) -> bool {
        self.audit.is_some()
    }

    pub fn with_limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Bound the number of in-flight requests; values below 1 are raised to 1
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        self.permits = Semaphore::new(max_concurrent);
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_git(mut self, git: GitConfig) -> Self {
        self.git = git;
        self
    }

    pub fn with_validator(mut self, validator: CommandValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Validate and run a request
    ///
    /// `Ok` always carries `success: true`. Rejections and failures come back
    /// as `GatewayError`; `ExecutionResult::from` turns them into the
    /// `success: false` shape.
    pub async fn execute(&self, request: &CommandRequest) -> Result<ExecutionResult> {
        let started = Instant::now();

        let result = match request.mode {
            CommandMode::Shell => self.run_shell(&request.text).await,
            CommandMode::Commit => self.commit(&request.text).await,
            CommandMode::Push => self.push().await,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(mode = %request.mode, elapsed_ms, "command succeeded"),
            Err(GatewayError::InvalidInput(message)) => {
                debug!(mode = %request.mode, "invalid input: {}", message)
            }
            Err(GatewayError::Forbidden { reason, .. }) => {
                warn!(mode = %request.mode, reason = %reason, "command rejected")
            }
            Err(GatewayError::ExecutionFailed(info)) => {
                warn!(mode = %request.mode, elapsed_ms, "command failed: {}", info.description())
            }
        }

        result
    }

    /// Like `execute`, with every error folded into the result value
    pub async fn execute_normalized(&self, request: &CommandRequest) -> ExecutionResult {
        self.execute(request)
            .await
            .unwrap_or_else(ExecutionResult::from)
    }

    /// Recent commits, newest first
    ///
    /// Never fails: an empty repository, a directory that is not a
    /// repository, or any execution failure all yield an empty list so the
    /// history panel keeps rendering.
    pub async fn history(&self) -> Vec<CommitEntry> {
        let invocation = git::commands::history(self.git.history_limit);

        let output = match self.admit().await {
            Ok(_permit) => self.run_checked(&invocation).await,
            Err(e) => Err(e),
        };

        match output {
            Ok(output) => git::parse_history(&output.stdout),
            Err(e) => {
                debug!("history unavailable, returning no commits: {}", e);
                Vec::new()
            }
        }
    }

    async fn run_shell(&self, text: &str) -> Result<ExecutionResult> {
        let validated = match self.validator.validate(text) {
            Ok(validated) => validated,
            Err(err) => {
                if let ValidationError::Forbidden { reason, .. } = &err {
                    self.audit(CommandMode::Shell, text, AuditOutcome::Rejected(reason.clone()));
                }
                return Err(err.into());
            }
        };

        let _permit = self.admit().await?;
        let invocation = Invocation::shell(validated.command);
        let output = self.run_audited(CommandMode::Shell, &invocation).await?;

        Ok(ExecutionResult::ok(output.display_output(SHELL_SUCCESS)))
    }

    /// Stage everything, then commit; a staging failure stops the commit
    async fn commit(&self, message: &str) -> Result<ExecutionResult> {
        if message.trim().is_empty() {
            return Err(GatewayError::InvalidInput(
                "Commit message cannot be empty".to_string(),
            ));
        }

        let _permit = self.admit().await?;
        self.run_audited(CommandMode::Commit, &git::commands::stage_all())
            .await?;
        let output = self
            .run_audited(CommandMode::Commit, &git::commands::commit(message))
            .await?;

        Ok(ExecutionResult::ok(output.display_output(COMMIT_SUCCESS)))
    }

    async fn push(&self) -> Result<ExecutionResult> {
        let invocation = git::commands::push(&self.git.remote, self.git.branch.as_deref());

        let _permit = self.admit().await?;
        let output = self.run_audited(CommandMode::Push, &invocation).await?;

        Ok(ExecutionResult::ok(output.display_output(PUSH_SUCCESS)))
    }

    async fn admit(&self) -> Result<SemaphorePermit<'_>> {
        self.permits.acquire().await.map_err(GatewayError::host)
    }

    /// Run an invocation, treating a non-zero exit as a failure
    async fn run_checked(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        let output = self.runner.run(invocation, &self.limits).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(ExitInfo::from_output(output).into())
        }
    }

    async fn run_audited(&self, mode: CommandMode, invocation: &Invocation) -> Result<ProcessOutput> {
        let result = self.run_checked(invocation).await;

        let outcome = match &result {
            Ok(output) => AuditOutcome::Exit(output.exit_code.unwrap_or_default()),
            Err(GatewayError::ExecutionFailed(info)) => match info.exit_code {
                Some(code) => AuditOutcome::Exit(code),
                None => AuditOutcome::Failed(info.description()),
            },
            Err(other) => AuditOutcome::Failed(other.to_string()),
        };
        self.audit(mode, &invocation.display(), outcome);

        result
    }

    fn audit(&self, mode: CommandMode, command: &str, outcome: AuditOutcome) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_execution(mode, command, &outcome) {
                warn!("Failed to write audit log {}: {}", audit.log_path().display(), e);
            }
        }
    }
}

fn open_audit_log(config: &Config) -> AppResult<AuditLogger> {
    let mut logger = AuditLogger::with_path(config.audit_path()?)?;
    if let Some(dir) = &config.execution.workdir {
        logger = logger.with_workdir(dir);
    }
    Ok(logger)
}
