//! Command execution for the test runner and tool version checks.
//!
//! [`CommandRunner`] is the synchronous seam the rest of the crate talks to.
//! [`ProcessRunner`] implements it by driving the async [`Executor`] on a
//! throwaway current-thread runtime.

use crate::core::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Exit code reported when a command is killed after its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Captured result of one command run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestRunResult {
    /// Standard output lines followed by standard error lines.
    pub output: Vec<String>,
    /// Process exit code; 0 means success.
    pub exit_code: i32,
}

impl TestRunResult {
    /// Creates a result.
    pub fn new<I, S>(output: I, exit_code: i32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output: output.into_iter().map(Into::into).collect(),
            exit_code,
        }
    }

    /// Returns true if the command exited with 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last non-blank output line, usually the runner's summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.output
            .iter()
            .rev()
            .map(String::as_str)
            .find(|line| !line.trim().is_empty())
    }

    /// The last `limit` output lines; `0` returns everything.
    #[must_use]
    pub fn tail(&self, limit: usize) -> &[String] {
        if limit == 0 || self.output.len() <= limit {
            &self.output
        } else {
            &self.output[self.output.len() - limit..]
        }
    }
}

/// Runs a shell command and captures its output and exit status.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Runs `command` in `cwd`, blocking until it exits.
    fn run(&self, command: &str, cwd: &Path) -> Result<TestRunResult>;
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Working directory for the command.
    pub cwd: Option<PathBuf>,
    /// Kill the command after this long. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl ExecuteOptions {
    /// Sets the working directory.
    #[must_use]
    pub fn cwd(mut self, path: impl AsRef<Path>) -> Self {
        self.cwd = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// Executor for running shell commands.
#[derive(Debug, Default)]
pub struct Executor;

impl Executor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Executes a shell command, capturing stdout and stderr line by line.
    pub async fn execute(&self, command: &str, options: ExecuteOptions) -> Result<TestRunResult> {
        let (shell, shell_arg) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let mut cmd = Command::new(shell);
        cmd.arg(shell_arg)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref cwd) = options.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            command: command.to_string(),
            source,
        })?;

        let stdout = tokio::spawn(read_lines(child.stdout.take()));
        let stderr = tokio::spawn(read_lines(child.stderr.take()));

        let status = match options.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
            None => Some(child.wait().await),
        };

        let Some(status) = status else {
            tracing::warn!(command, "command timed out");
            // Grandchildren may still hold the pipes open; don't wait on them.
            stdout.abort();
            stderr.abort();
            child
                .kill()
                .await
                .map_err(|e| Error::io("kill timed out command", e))?;
            return Ok(TestRunResult {
                output: vec![format!("Command timed out: {command}")],
                exit_code: TIMEOUT_EXIT_CODE,
            });
        };

        let exit_code = status
            .map_err(|e| Error::io("wait for command", e))?
            .code()
            .unwrap_or(1);

        let mut output = join_lines(stdout).await?;
        output.extend(join_lines(stderr).await?);

        Ok(TestRunResult { output, exit_code })
    }

    /// Checks if a command exists in PATH.
    #[must_use]
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }
}

/// Reads `stream` to EOF as lines, decoding each one lossily.
///
/// The pipe stays drained until the writer closes it, so a stray non-UTF-8
/// byte never stalls or kills the child.
async fn read_lines<R>(stream: Option<R>) -> std::io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    let Some(stream) = stream else {
        return Ok(lines);
    };

    let mut segments = BufReader::new(stream).split(b'\n');
    while let Some(mut segment) = segments.next_segment().await? {
        if segment.last() == Some(&b'\r') {
            segment.pop();
        }
        lines.push(String::from_utf8_lossy(&segment).into_owned());
    }
    Ok(lines)
}

async fn join_lines(
    handle: tokio::task::JoinHandle<std::io::Result<Vec<String>>>,
) -> Result<Vec<String>> {
    handle
        .await
        .map_err(|e| Error::Internal {
            message: format!("output reader task failed: {e}"),
        })?
        .map_err(|e| Error::io("read command output", e))
}

/// [`CommandRunner`] backed by real processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    spinner: bool,
}

impl ProcessRunner {
    /// Creates a runner with no timeout and no spinner.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: None,
            spinner: false,
        }
    }

    /// Kills commands that run longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shows a spinner on stderr while a command runs.
    #[must_use]
    pub const fn with_spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    fn progress(&self, command: &str) -> Option<ProgressBar> {
        if !self.spinner {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .ok()
                .unwrap_or_else(ProgressStyle::default_spinner),
        );
        pb.set_message(command.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &str, cwd: &Path) -> Result<TestRunResult> {
        tracing::debug!(command, cwd = %cwd.display(), "running command");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::io("create async runtime", e))?;

        let mut options = ExecuteOptions::default().cwd(cwd);
        if let Some(timeout) = self.timeout {
            options = options.timeout(timeout);
        }

        let pb = self.progress(command);
        let result = runtime.block_on(Executor::new().execute(command, options));
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let result = result?;
        tracing::debug!(
            command,
            exit_code = result.exit_code,
            lines = result.output.len(),
            "command finished"
        );
        Ok(result)
    }
}
