use std::io;
use thiserror::Error;

// Module-level errors wrapped by the types below
use crate::config::settings::ConfigError;
use crate::gateway::outcome::ExitInfo;
use crate::security::validator::ValidationError;

/// Errors surfaced by the execution gateway
///
/// Every variant is recovered at the gateway boundary and normalized into an
/// `ExecutionResult` with `success: false`; nothing is thrown past it.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller error, no process was spawned
    #[error("{0}")]
    InvalidInput(String),

    /// Policy rejection, no process was spawned
    #[error("Command not allowed for security reasons ({reason})")]
    Forbidden { pattern: String, reason: String },

    /// The process ran and failed, could not be started, or was killed
    #[error("{0}")]
    ExecutionFailed(ExitInfo),
}

impl GatewayError {
    /// Build a failure for an unexpected host-side problem
    pub fn host<E: std::fmt::Display>(err: E) -> Self {
        GatewayError::ExecutionFailed(ExitInfo::host(err.to_string()))
    }
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyCommand => GatewayError::InvalidInput("Invalid command".to_string()),
            ValidationError::Forbidden { pattern, reason } => {
                GatewayError::Forbidden { pattern, reason }
            }
        }
    }
}

impl From<ExitInfo> for GatewayError {
    fn from(info: ExitInfo) -> Self {
        GatewayError::ExecutionFailed(info)
    }
}

/// Top-level application error that wraps all module-specific errors
///
/// Used for startup and serving; request-level failures never reach this
/// type because the gateway absorbs them into `ExecutionResult`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
