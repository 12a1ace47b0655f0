use crate::gateway::outcome::{ExitInfo, ProcessOutput};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Wall-clock limit for a single process
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Combined stdout + stderr capture limit (10 MiB)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Resource bounds applied to every invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

/// A process to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Free-form command line interpreted by the shell
    Shell(String),
    /// Program with a discrete argument vector, no shell involved
    Program { program: String, args: Vec<String> },
}

impl Invocation {
    pub fn shell(command: impl Into<String>) -> Self {
        Invocation::Shell(command.into())
    }

    pub fn program<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::Program {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Render as a shell-like command line for logs and the audit trail
    ///
    /// Arguments containing anything beyond a conservative safe set are
    /// wrapped in double quotes with embedded `"` escaped as `\"`.
    pub fn display(&self) -> String {
        match self {
            Invocation::Shell(command) => command.clone(),
            Invocation::Program { program, args } => {
                let mut line = program.clone();
                for arg in args {
                    line.push(' ');
                    line.push_str(&quote_arg(arg));
                }
                line
            }
        }
    }
}

fn quote_arg(arg: &str) -> String {
    let is_plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:%@+,".contains(c));

    if is_plain {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('"', "\\\""))
    }
}

/// Starts processes on behalf of the gateway
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `invocation` to completion under `limits`
    ///
    /// Returns the captured output for any process that exited on its own,
    /// whatever its exit code. Spawn failures, timeouts and output overruns
    /// are returned as `ExitInfo`, and the process has been killed and
    /// reaped by the time the error is returned.
    async fn run(
        &self,
        invocation: &Invocation,
        limits: &ExecutionLimits,
    ) -> Result<ProcessOutput, ExitInfo>;
}

/// Runs processes on the host with tokio
#[derive(Debug, Clone)]
pub struct SystemRunner {
    shell: String,
    workdir: Option<PathBuf>,
}

impl SystemRunner {
    /// Runner using `sh` that inherits the current working directory
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
            workdir: None,
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_workdir<P: AsRef<Path>>(mut self, workdir: P) -> Self {
        self.workdir = Some(workdir.as_ref().to_path_buf());
        self
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn build_command(&self, invocation: &Invocation) -> Command {
        let mut command = match invocation {
            Invocation::Shell(text) => {
                let mut command = Command::new(&self.shell);
                command.arg("-c").arg(text);
                command
            }
            Invocation::Program { program, args } => {
                let mut command = Command::new(program);
                command.args(args);
                command
            }
        };

        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout can take down everything the shell started
        #[cfg(unix)]
        command.process_group(0);

        command
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        limits: &ExecutionLimits,
    ) -> Result<ProcessOutput, ExitInfo> {
        let mut child = self
            .build_command(invocation)
            .spawn()
            .map_err(|e| ExitInfo::spawn_failed(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExitInfo::host("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExitInfo::host("stderr was not captured"))?;

        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = tokio::time::timeout(
            limits.timeout,
            capture(&mut child, stdout, stderr, &mut out, &mut err, limits.max_output_bytes),
        )
        .await;

        match outcome {
            Ok(Ok(status)) => Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&out).into_owned(),
                stderr: String::from_utf8_lossy(&err).into_owned(),
                exit_code: status.code(),
            }),
            Ok(Err(CaptureError::LimitExceeded)) => {
                warn!(
                    "Output limit of {} bytes exceeded, killing: {}",
                    limits.max_output_bytes,
                    invocation.display()
                );
                terminate(&mut child).await;
                Err(ExitInfo::output_limit(limits.max_output_bytes)
                    .with_stderr(String::from_utf8_lossy(&err)))
            }
            Ok(Err(CaptureError::Io(e))) => {
                terminate(&mut child).await;
                Err(ExitInfo::host(format!("Failed to read command output: {}", e)))
            }
            Err(_) => {
                warn!(
                    "Timed out after {:?}, killing: {}",
                    limits.timeout,
                    invocation.display()
                );
                terminate(&mut child).await;
                Err(ExitInfo::timed_out(limits.timeout).with_stderr(String::from_utf8_lossy(&err)))
            }
        }
    }
}

enum CaptureError {
    LimitExceeded,
    Io(io::Error),
}

impl From<io::Error> for CaptureError {
    fn from(err: io::Error) -> Self {
        CaptureError::Io(err)
    }
}

/// Drain both pipes concurrently into `out` and `err` until EOF, then reap the child
///
/// The buffers belong to the caller so whatever was read survives a timeout.
async fn capture<O, E>(
    child: &mut Child,
    mut stdout: O,
    mut stderr: E,
    out: &mut Vec<u8>,
    err: &mut Vec<u8>,
    limit: usize,
) -> Result<ExitStatus, CaptureError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_chunk = vec![0u8; READ_CHUNK_SIZE];
    let mut err_chunk = vec![0u8; READ_CHUNK_SIZE];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_chunk), if out_open => {
                match read? {
                    0 => out_open = false,
                    n => out.extend_from_slice(&out_chunk[..n]),
                }
            }
            read = stderr.read(&mut err_chunk), if err_open => {
                match read? {
                    0 => err_open = false,
                    n => err.extend_from_slice(&err_chunk[..n]),
                }
            }
        }

        if out.len() + err.len() > limit {
            return Err(CaptureError::LimitExceeded);
        }
    }

    Ok(child.wait().await?)
}

/// Kill the child's process group and reap the child
async fn terminate(child: &mut Child) {
    kill_process_group(child);

    if let Err(e) = child.kill().await {
        debug!("Failed to kill child process: {}", e);
    }
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let Some(pid) = child.id() else {
        return;
    };

    // The child was spawned with process_group(0), so its pid is the group id
    let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
    if rc != 0 {
        debug!(
            "killpg({}) failed: {}",
            pid,
            io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}
