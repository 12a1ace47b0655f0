pub mod audit;
pub mod config;
pub mod error;
pub mod gateway;
pub mod git;
pub mod security;
pub mod server;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult, GatewayError, Result};
pub use gateway::{CommandMode, CommandRequest, ExecutionResult, Gateway};
