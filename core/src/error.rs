use std::path::PathBuf;

use thiserror::Error;

/// Every way a blame or commit-detail lookup can fail.
///
/// None of these are fatal: callers are expected to render no annotation for
/// the affected file or line and carry on.
#[derive(Debug, Error)]
pub enum BlameError {
    /// The file is not inside any registered workspace folder.
    #[error("no workspace folder contains {}", path.display())]
    NoWorkspace { path: PathBuf },

    /// git could not be spawned, exited non-zero, or produced too much output.
    /// `command` is the full command line, program included.
    #[error("`{command}` failed: {reason}")]
    Command { command: String, reason: String },

    /// git ran but its output was structurally unusable.
    #[error("malformed git output: {0}")]
    Parse(String),
}

impl BlameError {
    pub fn command(program: &str, args: &[String], reason: impl Into<String>) -> Self {
        let command = std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        BlameError::Command {
            command,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BlameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_message() {
        let args = vec!["blame".to_string(), "--porcelain".to_string()];
        let err = BlameError::command("git", &args, "fatal: no such path");
        assert_eq!(
            err.to_string(),
            "`git blame --porcelain` failed: fatal: no such path"
        );

        let err = BlameError::command("/usr/local/bin/git2", &args, "exit status: 1");
        assert_eq!(
            err.to_string(),
            "`/usr/local/bin/git2 blame --porcelain` failed: exit status: 1"
        );
    }

    #[test]
    fn test_no_workspace_message() {
        let err = BlameError::NoWorkspace {
            path: PathBuf::from("/tmp/loose.rs"),
        };
        assert_eq!(err.to_string(), "no workspace folder contains /tmp/loose.rs");
    }
}
