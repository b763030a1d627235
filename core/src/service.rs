use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::blame::{parse_blame_porcelain, parse_commit_detail, DetailedCommitRecord, FileAttributionMap};
use crate::clock::{Clock, SystemClock};
use crate::config::BlameConfig;
use crate::error::{BlameError, Result};
use crate::format::{self, Annotation, CodeLens};
use crate::git::{GitCommand, GitInvoker, WorkspaceFolders};
use crate::store::AttributionStore;

/// Editor notifications that matter to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent<'a> {
    Opened(&'a Path),
    SelectionChanged(&'a Path),
    Changed(&'a Path),
    Saved(&'a Path),
}

/// Fetches, caches, and resolves blame data for open files.
///
/// One instance is built by the host at startup and shared by every
/// consumer (inline annotations, hovers, code lenses, the detail panel), so
/// each file and commit has exactly one cached copy.
///
/// Concurrent fetches of the same file are not coalesced; each one runs git
/// and the last to finish wins the cache slot. Results are deterministic for
/// a given revision, so that only costs time.
pub struct BlameService<G, C = SystemClock> {
    git: G,
    clock: C,
    store: AttributionStore,
    folders: Mutex<WorkspaceFolders>,
}

impl<G: GitInvoker, C: Clock> BlameService<G, C> {
    pub fn new(git: G, clock: C, folders: WorkspaceFolders) -> Self {
        BlameService {
            git,
            clock,
            store: AttributionStore::new(),
            folders: Mutex::new(folders),
        }
    }

    pub fn git(&self) -> &G {
        &self.git
    }

    pub fn store(&self) -> &AttributionStore {
        &self.store
    }

    fn folders(&self) -> MutexGuard<'_, WorkspaceFolders> {
        self.folders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_workspace_folder(&self, root: impl Into<PathBuf>) {
        self.folders().add(root);
    }

    pub fn remove_workspace_folder(&self, root: &Path) -> bool {
        self.folders().remove(root)
    }

    /// Workspace root and root-relative path for `file`.
    fn locate(&self, file: &Path) -> Result<(PathBuf, PathBuf)> {
        self.folders()
            .split(file)
            .map(|(root, relative)| (root.to_path_buf(), relative.to_path_buf()))
            .ok_or_else(|| BlameError::NoWorkspace {
                path: file.to_path_buf(),
            })
    }

    /// Line attribution for `file`, from the cache when possible.
    pub async fn fetch(&self, file: &Path) -> Result<Arc<FileAttributionMap>> {
        if let Some(cached) = self.store.get(file) {
            debug!(path = %file.display(), "blame cache hit");
            return Ok(cached);
        }

        let (root, relative) = self.locate(file)?;
        debug!(path = %file.display(), root = %root.display(), "blame cache miss");

        let args = GitCommand::Blame {
            relative_path: &relative,
        }
        .args();
        let output = self.git.run(&root, &args).await?;

        let attributions = parse_blame_porcelain(&output, self.clock.now());
        debug!(path = %file.display(), lines = attributions.len(), "parsed blame");
        Ok(self.store.set(file, attributions))
    }

    /// Full metadata for `commit_id`, as seen from `file`'s repository.
    ///
    /// The metadata and branch queries run concurrently; if either fails the
    /// whole lookup fails and nothing is cached.
    pub async fn resolve_detail(
        &self,
        commit_id: &str,
        file: &Path,
    ) -> Result<Arc<DetailedCommitRecord>> {
        if let Some(cached) = self.store.get_detail(commit_id, file) {
            debug!(commit = commit_id, "commit detail cache hit");
            return Ok(cached);
        }

        let (root, _) = self.locate(file)?;
        let show_args = GitCommand::Show { commit_id }.args();
        let name_rev_args = GitCommand::NameRev { commit_id }.args();

        let (show, name_rev) = tokio::try_join!(
            self.git.run(&root, &show_args),
            self.git.run(&root, &name_rev_args),
        )?;

        let detail = parse_commit_detail(commit_id, &show, &name_rev, self.clock.now())?;
        Ok(self.store.set_detail(commit_id, file, detail))
    }

    /// Web URL of the GitHub repository `file` belongs to. Any failure,
    /// including a non-GitHub remote, gives `None`.
    pub async fn github_repo_url(&self, file: &Path) -> Option<String> {
        let (root, _) = self.locate(file).ok()?;
        let remote = self
            .git
            .run(&root, &GitCommand::RemoteUrl.args())
            .await
            .map_err(|e| debug!(error = %e, "no origin remote"))
            .ok()?;
        format::github_repo_url(&remote)
    }

    /// Apply the invalidation rule: edits and saves drop the file's
    /// attribution, opening a file or moving the cursor does not.
    /// Returns whether a cached map was dropped.
    pub fn handle_event(&self, event: EditorEvent<'_>) -> bool {
        match event {
            EditorEvent::Changed(path) | EditorEvent::Saved(path) => self.store.invalidate(path),
            EditorEvent::Opened(_) | EditorEvent::SelectionChanged(_) => false,
        }
    }

    pub fn invalidate(&self, file: &Path) -> bool {
        self.store.invalidate(file)
    }

    pub fn invalidate_all(&self) {
        self.store.invalidate_all();
    }

    /// Inline annotations for `file`, or none if blame is unavailable.
    pub async fn annotations(
        &self,
        file: &Path,
        lines: &[&str],
        cursor_line: u32,
        config: &BlameConfig,
    ) -> Vec<Annotation> {
        if !config.enabled {
            return Vec::new();
        }
        match self.fetch(file).await {
            Ok(attributions) => format::annotations(&attributions, lines, cursor_line, config),
            Err(e) => {
                debug!(path = %file.display(), error = %e, "no blame annotations");
                Vec::new()
            }
        }
    }

    /// Code lenses for `file`, or none if blame is unavailable.
    pub async fn code_lenses(
        &self,
        file: &Path,
        lines: &[&str],
        config: &BlameConfig,
    ) -> Vec<CodeLens> {
        if !config.enabled || !config.show_code_lens {
            return Vec::new();
        }
        match self.fetch(file).await {
            Ok(attributions) => format::code_lenses(&attributions, lines, config),
            Err(e) => {
                debug!(path = %file.display(), error = %e, "no blame code lenses");
                Vec::new()
            }
        }
    }
}
