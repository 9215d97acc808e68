use crate::common::error::MetapinError;
use crate::common::result::{async_helpers, MetapinResult};
use crate::domain::entities::workspace::WorkspaceConfig;
use crate::infrastructure::git::command::GitCommand;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Text used in error reports: stderr, or stdout when stderr is empty.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Executes git commands in a working directory.
///
/// Non-zero exits are reported through [`CommandOutput::exit_code`], not as
/// errors; only failing to run git at all is an `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, dir: &Path, command: &GitCommand) -> MetapinResult<CommandOutput>;
}

/// [`GitRunner`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    executable: String,
    timeout: Option<Duration>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            executable: "git".to_string(),
            timeout: None,
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self::with_executable(config.git_executable.clone()).with_timeout(config.command_timeout)
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    async fn spawn(&self, dir: &Path, command: &GitCommand) -> MetapinResult<CommandOutput> {
        let output = Command::new(&self.executable)
            .args(command.to_args())
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MetapinError::command_spawn(command.to_string(), e))?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl GitRunner for GitCli {
    async fn run(&self, dir: &Path, command: &GitCommand) -> MetapinResult<CommandOutput> {
        debug!("{} (in {})", command, dir.display());
        let output = async_helpers::with_timeout(self.spawn(dir, command), self.timeout).await?;
        debug!("exit code {:?}", output.exit_code);
        Ok(output)
    }
}
