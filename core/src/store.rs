use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::blame::{DetailedCommitRecord, FileAttributionMap};

/// In-memory cache for blame results and commit details.
///
/// File maps are replaced wholesale and dropped on invalidation, never
/// patched. Commit details are immutable history, so they are only dropped
/// by [`AttributionStore::invalidate_all`].
#[derive(Debug, Default)]
pub struct AttributionStore {
    files: Mutex<HashMap<PathBuf, Arc<FileAttributionMap>>>,
    details: Mutex<HashMap<(String, PathBuf), Arc<DetailedCommitRecord>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Poisoning is ignored: the maps hold no cross-entry invariants.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AttributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<FileAttributionMap>> {
        lock(&self.files).get(path).cloned()
    }

    /// Store the map for `path`, replacing any previous one.
    pub fn set(&self, path: impl Into<PathBuf>, map: FileAttributionMap) -> Arc<FileAttributionMap> {
        let map = Arc::new(map);
        lock(&self.files).insert(path.into(), Arc::clone(&map));
        map
    }

    /// Drop the cached map for `path`. Returns whether one was cached.
    pub fn invalidate(&self, path: &Path) -> bool {
        let removed = lock(&self.files).remove(path).is_some();
        if removed {
            debug!(path = %path.display(), "invalidated blame cache entry");
        }
        removed
    }

    /// Drop every cached file map and commit detail.
    pub fn invalidate_all(&self) {
        lock(&self.files).clear();
        lock(&self.details).clear();
        debug!("cleared blame and commit detail caches");
    }

    pub fn get_detail(&self, commit_id: &str, path: &Path) -> Option<Arc<DetailedCommitRecord>> {
        lock(&self.details)
            .get(&(commit_id.to_string(), path.to_path_buf()))
            .cloned()
    }

    pub fn set_detail(
        &self,
        commit_id: &str,
        path: impl Into<PathBuf>,
        detail: DetailedCommitRecord,
    ) -> Arc<DetailedCommitRecord> {
        let detail = Arc::new(detail);
        lock(&self.details).insert((commit_id.to_string(), path.into()), Arc::clone(&detail));
        detail
    }

    pub fn file_count(&self) -> usize {
        lock(&self.files).len()
    }

    pub fn detail_count(&self) -> usize {
        lock(&self.details).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blame::AttributionRecord;

    fn record(author: &str) -> AttributionRecord {
        AttributionRecord {
            author: author.to_string(),
            author_email: String::new(),
            date: "yesterday".to_string(),
            author_timestamp: 0,
            commit_id: "abcdef01".to_string(),
            commit_summary: "x".to_string(),
            branch: "main".to_string(),
        }
    }

    fn detail() -> DetailedCommitRecord {
        DetailedCommitRecord {
            record: record("Alice"),
            full_message: "x".to_string(),
            author_date_raw: String::new(),
            committer_name: String::new(),
            committer_email: String::new(),
        }
    }

    #[test]
    fn test_set_get_invalidate() {
        let store = AttributionStore::new();
        let path = Path::new("/ws/src/lib.rs");
        assert!(store.get(path).is_none());

        let stored = store.set(path, FileAttributionMap::from([(1, record("Alice"))]));
        let fetched = store.get(path).unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));

        assert!(store.invalidate(path));
        assert!(!store.invalidate(path));
        assert!(store.get(path).is_none());
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let store = AttributionStore::new();
        let path = Path::new("/ws/a.rs");
        store.set(path, FileAttributionMap::from([(1, record("Alice")), (2, record("Alice"))]));
        store.set(path, FileAttributionMap::from([(3, record("Bob"))]));

        let map = store.get(path).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&3].author, "Bob");
    }

    #[test]
    fn test_file_invalidation_keeps_details() {
        let store = AttributionStore::new();
        let path = Path::new("/ws/a.rs");
        store.set(path, FileAttributionMap::new());
        store.set_detail("abcdef01", path, detail());

        store.invalidate(path);
        assert!(store.get_detail("abcdef01", path).is_some());
        assert!(store.get_detail("abcdef01", Path::new("/ws/b.rs")).is_none());

        store.invalidate_all();
        assert_eq!(store.file_count(), 0);
        assert_eq!(store.detail_count(), 0);
    }
}
