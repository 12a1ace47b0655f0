use crate::gateway::request::CommandMode;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// How an audited command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Process exited with this code
    Exit(i32),
    /// Process never produced an exit code (spawn failure, timeout, output cap)
    Failed(String),
    /// Validation refused to run it
    Rejected(String),
}

/// Append-only plain-text record of what the gateway ran
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
    workdir: PathBuf,
}

impl AuditLogger {
    /// Create an AuditLogger writing to `path`
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        // Ensure directory exists
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Ok(Self { log_path, workdir })
    }

    /// Record `workdir` as the directory commands run in
    pub fn with_workdir<P: AsRef<Path>>(mut self, workdir: P) -> Self {
        self.workdir = workdir.as_ref().to_path_buf();
        self
    }

    /// Log the end of a command execution
    pub fn log_execution(
        &self,
        mode: CommandMode,
        command: &str,
        outcome: &AuditOutcome,
    ) -> std::io::Result<()> {
        let status = match outcome {
            AuditOutcome::Exit(code) => format!("exit:{}", code),
            AuditOutcome::Failed(_) => "FAILED".to_string(),
            AuditOutcome::Rejected(_) => "REJECTED".to_string(),
        };

        let mut entry = format!("[{}] [{}] {}", mode, status, escape_field(command));
        match outcome {
            AuditOutcome::Failed(reason) | AuditOutcome::Rejected(reason) => {
                entry.push_str(&format!(" reason=\"{}\"", escape_field(reason)));
            }
            AuditOutcome::Exit(_) => {}
        }

        self.append(&entry)
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        // Check and rotate log if needed
        self.rotate_if_needed()?;

        let timestamp = Utc::now().to_rfc3339();
        let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());

        let line = format!(
            "[{}] [{}] [{}] {}\n",
            timestamp,
            user,
            self.workdir.display(),
            entry
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(line.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            // Rotate: history.log -> history.log.1
            let backup_path = self.log_path.with_extension("log.1");
            fs::rename(&self.log_path, backup_path)?;
        }

        Ok(())
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

/// Keep one record per line: line breaks, quotes and backslashes are escaped
fn escape_field(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c if c.is_control() => escaped.extend(c.escape_default()),
            c => escaped.push(c),
        }
    }
    escaped
}
