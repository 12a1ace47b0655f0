#![allow(dead_code)]

use async_trait::async_trait;
use gitdeck::Gateway;
use gitdeck::gateway::{ExecutionLimits, ExitInfo, Invocation, ProcessOutput, ProcessRunner, SystemRunner};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Helper to create a test git repository
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    // Initialize git repo
    Command::new("git")
        .args(["init"])
        .current_dir(&repo_path)
        .output()
        .expect("Failed to init git repo");

    // Configure git
    Command::new("git")
        .args(["config", "user.name", "Test User"])
        .current_dir(&repo_path)
        .output()
        .expect("Failed to set git user.name");

    Command::new("git")
        .args(["config", "user.email", "test@example.com"])
        .current_dir(&repo_path)
        .output()
        .expect("Failed to set git user.email");

    Command::new("git")
        .args(["config", "commit.gpgsign", "false"])
        .current_dir(&repo_path)
        .output()
        .expect("Failed to disable commit signing");

    (temp_dir, repo_path)
}

/// Helper to create a commit
pub fn create_commit(repo_path: &Path, file: &str, content: &str, message: &str) {
    fs::write(repo_path.join(file), content).expect("Failed to write file");

    Command::new("git")
        .args(["add", file])
        .current_dir(repo_path)
        .output()
        .expect("Failed to add file");

    Command::new("git")
        .args(["commit", "-m", message])
        .current_dir(repo_path)
        .output()
        .expect("Failed to commit");
}

/// Subject line of the latest commit
pub fn last_commit_subject(repo_path: &Path) -> String {
    let output = Command::new("git")
        .args(["log", "-1", "--format=%s"])
        .current_dir(repo_path)
        .output()
        .expect("Failed to read git log");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Gateway running real processes in `workdir`
pub fn system_gateway(workdir: &Path) -> Gateway {
    Gateway::new(Arc::new(SystemRunner::new().with_workdir(workdir)))
}

/// Gateway with a short timeout, for tests that must not wait 30 seconds
pub fn fast_gateway(workdir: &Path, timeout: Duration, max_output_bytes: usize) -> Gateway {
    system_gateway(workdir).with_limits(ExecutionLimits {
        timeout,
        max_output_bytes,
    })
}

/// Runner that never starts a process; records calls and in-flight peaks
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        _limits: &ExecutionLimits,
    ) -> Result<ProcessOutput, ExitInfo> {
        self.calls.lock().unwrap().push(invocation.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(ProcessOutput {
            stdout: "ok\n".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }
}
