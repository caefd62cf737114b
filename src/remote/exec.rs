// SSH command execution with bounded timeouts

use crate::config::Config;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default per-command deadline for control actions
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Captured output of one remote command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecOutput {
    pub fn ok(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout if non-empty, otherwise stderr
    pub fn combined(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            self.stdout.clone()
        }
    }

    pub(crate) fn timed_out() -> Self {
        Self {
            stdout: String::new(),
            stderr: "Command timed out".to_string(),
            exit_code: 1,
        }
    }

    pub(crate) fn failed(stderr: String) -> Self {
        Self {
            stdout: String::new(),
            stderr,
            exit_code: 1,
        }
    }
}

/// Transport seam for running one shell command on the managed host.
///
/// Infallible by contract: timeouts, auth failures and unreachable hosts
/// all collapse into a nonzero-exit `ExecOutput` with a synthetic stderr,
/// so callers branch on `exit_code`, never on a raised error.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn run(&self, command: &str, limit: Duration) -> ExecOutput;
}

/// Executor backed by the system `ssh` client.
///
/// One short-lived session per call. Auth is key/agent only
/// (`BatchMode=yes`), so no credential ever appears on a command line.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    host: String,
    user: String,
    port: u16,
    identity_file: Option<PathBuf>,
    connect_timeout: Duration,
}

impl SshExecutor {
    pub fn new(
        host: String,
        user: String,
        port: u16,
        identity_file: Option<PathBuf>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            host,
            user,
            port,
            identity_file,
            connect_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.host.clone(),
            config.user.clone(),
            config.ssh_port,
            config.identity_file.clone(),
            config.connect_timeout(),
        )
    }

    pub(crate) fn build_command(&self, command: &str) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg("StrictHostKeyChecking=accept-new")
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout.as_secs()))
            .arg("-p")
            .arg(self.port.to_string());

        if let Some(identity) = &self.identity_file {
            cmd.arg("-i").arg(identity);
        }

        cmd.arg(format!("{}@{}", self.user, self.host)).arg(command);
        cmd
    }
}

#[async_trait]
impl Executor for SshExecutor {
    async fn run(&self, command: &str, limit: Duration) -> ExecOutput {
        tracing::debug!("Running remote command on {}: {}", self.host, command);
        let result = run_process(self.build_command(command), limit).await;
        if !result.ok() {
            tracing::warn!(
                "Remote command exited {} on {}: {}",
                result.exit_code,
                self.host,
                result.stderr
            );
        }
        result
    }
}

/// Spawn a prepared command and race it against the deadline.
///
/// The child has `kill_on_drop` set, so when the timeout fires the dropped
/// future terminates the process; nothing is left running on either path.
pub(crate) async fn run_process(mut cmd: Command, limit: Duration) -> ExecOutput {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return ExecOutput::failed(format!("Failed to spawn command: {}", e)),
    };

    match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code().unwrap_or(1),
        },
        Ok(Err(e)) => ExecOutput::failed(format!("Failed to read command output: {}", e)),
        Err(_) => ExecOutput::timed_out(),
    }
}
