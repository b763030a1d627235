#[cfg(not(target_arch = "wasm32"))]
pub mod process;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::blame::detail::SHOW_FORMAT;
use crate::error::Result;

#[cfg(not(target_arch = "wasm32"))]
pub use process::ProcessInvoker;

/// Runs git. The only suspension point in the blame pipeline.
#[async_trait]
pub trait GitInvoker: Send + Sync {
    /// Run git with `args` in `cwd` and return its stdout.
    ///
    /// Spawn failures, non-zero exits, and oversized output are all
    /// [`BlameError::Command`](crate::BlameError::Command).
    async fn run(&self, cwd: &Path, args: &[String]) -> Result<String>;
}

/// The git queries the extension issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommand<'a> {
    /// Per-line attribution in porcelain format.
    Blame { relative_path: &'a Path },
    /// One pipe-delimited line of commit metadata.
    Show { commit_id: &'a str },
    /// Symbolic ref name containing the commit.
    NameRev { commit_id: &'a str },
    /// URL of the `origin` remote.
    RemoteUrl,
}

impl GitCommand<'_> {
    pub fn args(&self) -> Vec<String> {
        match self {
            GitCommand::Blame { relative_path } => vec![
                "blame".to_string(),
                "--porcelain".to_string(),
                "--".to_string(),
                relative_path.to_string_lossy().into_owned(),
            ],
            GitCommand::Show { commit_id } => vec![
                "show".to_string(),
                SHOW_FORMAT.to_string(),
                "--no-patch".to_string(),
                commit_id.to_string(),
            ],
            GitCommand::NameRev { commit_id } => vec![
                "name-rev".to_string(),
                "--name-only".to_string(),
                commit_id.to_string(),
            ],
            GitCommand::RemoteUrl => vec![
                "remote".to_string(),
                "get-url".to_string(),
                "origin".to_string(),
            ],
        }
    }
}

/// The project folders open in the editor. git runs with the folder
/// containing a file as its working directory.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceFolders {
    roots: Vec<PathBuf>,
}

impl WorkspaceFolders {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        WorkspaceFolders {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        if !self.roots.contains(&root) {
            self.roots.push(root);
        }
    }

    pub fn remove(&mut self, root: &Path) -> bool {
        let before = self.roots.len();
        self.roots.retain(|r| r != root);
        self.roots.len() != before
    }

    /// The deepest folder containing `file`, if any.
    pub fn resolve(&self, file: &Path) -> Option<&Path> {
        self.roots
            .iter()
            .filter(|root| file.starts_with(root))
            .max_by_key(|root| root.components().count())
            .map(PathBuf::as_path)
    }

    /// The folder containing `file` and `file` relative to it.
    pub fn split<'a>(&'a self, file: &'a Path) -> Option<(&'a Path, &'a Path)> {
        let root = self.resolve(file)?;
        let relative = file.strip_prefix(root).ok()?;
        Some((root, relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        assert_eq!(
            GitCommand::Blame { relative_path: Path::new("src/my file.rs") }.args(),
            vec!["blame", "--porcelain", "--", "src/my file.rs"]
        );
        assert_eq!(
            GitCommand::Show { commit_id: "abcdef01" }.args(),
            vec!["show", "--format=%an|%ae|%ad|%cn|%ce|%s|%B", "--no-patch", "abcdef01"]
        );
        assert_eq!(
            GitCommand::NameRev { commit_id: "abcdef01" }.args(),
            vec!["name-rev", "--name-only", "abcdef01"]
        );
        assert_eq!(GitCommand::RemoteUrl.args(), vec!["remote", "get-url", "origin"]);
    }

    #[test]
    fn test_resolve_picks_deepest_root() {
        let folders = WorkspaceFolders::new(["/ws", "/ws/vendor/lib", "/other"]);
        assert_eq!(
            folders.resolve(Path::new("/ws/src/main.rs")),
            Some(Path::new("/ws"))
        );
        assert_eq!(
            folders.resolve(Path::new("/ws/vendor/lib/src/a.rs")),
            Some(Path::new("/ws/vendor/lib"))
        );
        assert_eq!(folders.resolve(Path::new("/elsewhere/a.rs")), None);
        // component-wise, not string prefix
        assert_eq!(folders.resolve(Path::new("/wsx/a.rs")), None);
    }

    #[test]
    fn test_split() {
        let folders = WorkspaceFolders::new(["/ws"]);
        let (root, relative) = folders.split(Path::new("/ws/src/main.rs")).unwrap();
        assert_eq!(root, Path::new("/ws"));
        assert_eq!(relative, Path::new("src/main.rs"));
    }

    #[test]
    fn test_add_remove() {
        let mut folders = WorkspaceFolders::default();
        folders.add("/ws");
        folders.add("/ws");
        assert!(folders.resolve(Path::new("/ws/a")).is_some());
        assert!(folders.remove(Path::new("/ws")));
        assert!(!folders.remove(Path::new("/ws")));
        assert!(folders.resolve(Path::new("/ws/a")).is_none());
    }
}
