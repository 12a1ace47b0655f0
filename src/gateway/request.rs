use std::fmt;

/// Which entry point a request came through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandMode {
    /// Free-form shell command from the terminal
    Shell,
    /// Stage everything, then commit with the request text as the message
    Commit,
    /// Push to the configured upstream; the request text is ignored
    Push,
}

impl fmt::Display for CommandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandMode::Shell => "shell",
            CommandMode::Commit => "commit",
            CommandMode::Push => "push",
        };
        f.write_str(name)
    }
}

/// A single request to the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub text: String,
    pub mode: CommandMode,
}

impl CommandRequest {
    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            text: command.into(),
            mode: CommandMode::Shell,
        }
    }

    pub fn commit(message: impl Into<String>) -> Self {
        Self {
            text: message.into(),
            mode: CommandMode::Commit,
        }
    }

    pub fn push() -> Self {
        Self {
            text: String::new(),
            mode: CommandMode::Push,
        }
    }
}
