use thiserror::Error;
use crate::security::denylist::Denylist;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Command matches denylist pattern '{pattern}': {reason}")]
    Forbidden { pattern: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct ValidatedCommand {
    pub command: String,
}

/// Validates free-form shell commands before they are handed to a shell
#[derive(Debug, Clone, Default)]
pub struct CommandValidator {
    denylist: Denylist,
}

impl CommandValidator {
    pub fn new() -> Self {
        Self {
            denylist: Denylist::new(),
        }
    }

    pub fn with_denylist(denylist: Denylist) -> Self {
        Self { denylist }
    }

    /// Validate a shell command
    ///
    /// Checks run in order and fail fast: blank input first, then the
    /// denylist. The accepted command keeps its original text, including any
    /// surrounding whitespace, since that is what the shell will see.
    pub fn validate(&self, command: &str) -> Result<ValidatedCommand, ValidationError> {
        if command.trim().is_empty() {
            return Err(ValidationError::EmptyCommand);
        }

        if let Some(entry) = self.denylist.check(command) {
            return Err(ValidationError::Forbidden {
                pattern: entry.pattern().to_string(),
                reason: entry.reason().to_string(),
            });
        }

        Ok(ValidatedCommand {
            command: command.to_string(),
        })
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }
}
