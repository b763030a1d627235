use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::GitInvoker;
use crate::error::{BlameError, Result};

/// Output ceiling for a single git invocation. Blame output for large files
/// runs to several megabytes.
pub const DEFAULT_MAX_OUTPUT: usize = 10 * 1024 * 1024;

/// Spawns the git executable as a child process.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    program: PathBuf,
    max_output: usize,
}

impl Default for ProcessInvoker {
    fn default() -> Self {
        ProcessInvoker {
            program: PathBuf::from("git"),
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }
}

impl ProcessInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable instead of `git` from `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_max_output(mut self, bytes: usize) -> Self {
        self.max_output = bytes;
        self
    }
}

impl ProcessInvoker {
    fn error(&self, args: &[String], reason: impl Into<String>) -> BlameError {
        BlameError::command(&self.program.to_string_lossy(), args, reason)
    }
}

/// Only the head of stderr is kept for error messages; the rest is drained.
const STDERR_KEEP: u64 = 64 * 1024;

#[async_trait]
impl GitInvoker for ProcessInvoker {
    async fn run(&self, cwd: &Path, args: &[String]) -> Result<String> {
        debug!(cwd = %cwd.display(), args = ?args, "running git");

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!(error = %e, "failed to spawn git");
                self.error(args, format!("failed to execute {}: {e}", self.program.display()))
            })?;

        let (Some(stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(self.error(args, "child pipes were not captured"));
        };

        // One byte past the ceiling is enough to tell that it was exceeded.
        let limit = (self.max_output as u64).saturating_add(1);
        let read_stdout = async {
            let mut buf = Vec::new();
            stdout.take(limit).read_to_end(&mut buf).await?;
            if buf.len() > self.max_output {
                // Killing closes stderr too, which lets the drain below finish.
                child.start_kill()?;
            }
            Ok::<_, std::io::Error>(buf)
        };
        let read_stderr = async {
            let mut buf = Vec::new();
            (&mut stderr).take(STDERR_KEEP).read_to_end(&mut buf).await?;
            tokio::io::copy(&mut stderr, &mut tokio::io::sink()).await?;
            Ok::<_, std::io::Error>(buf)
        };
        let (stdout, stderr) = tokio::join!(read_stdout, read_stderr);
        let stdout = stdout.map_err(|e| self.error(args, format!("failed to read output: {e}")))?;
        let stderr = stderr.map_err(|e| self.error(args, format!("failed to read output: {e}")))?;

        if stdout.len() > self.max_output {
            // Reap the killed child; its exit status is irrelevant now.
            let _ = child.wait().await;
            warn!(limit = self.max_output, "git output exceeded the limit, killed");
            return Err(self.error(
                args,
                format!("output exceeds the {} byte limit", self.max_output),
            ));
        }

        let status = child
            .wait()
            .await
            .map_err(|e| self.error(args, format!("failed to wait for git: {e}")))?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            warn!(status = %status, stderr = %stderr.trim(), "git exited with an error");
            return Err(self.error(args, format!("{}: {}", status, stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}
