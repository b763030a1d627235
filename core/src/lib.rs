pub mod blame;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod git;
pub mod service;
pub mod store;

use std::path::Path;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use blame::{AttributionRecord, DetailedCommitRecord, FileAttributionMap};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AvatarStyle, BlameConfig};
pub use error::BlameError;
#[cfg(not(target_arch = "wasm32"))]
pub use git::ProcessInvoker;
pub use git::{GitCommand, GitInvoker, WorkspaceFolders};
pub use service::{BlameService, EditorEvent};
pub use store::AttributionStore;

// ---------------------------------------------------------------------------
// JSON helpers. The extension host talks to this module in JSON strings and
// never sees a thrown error; failures come back as { "error": "..." }.
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ErrorResult {
    error: String,
}

fn json_error(msg: &str) -> String {
    serde_json::to_string(&ErrorResult {
        error: msg.to_string(),
    })
    .unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", msg))
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| json_error(&format!("Serialization error: {}", e)))
}

fn parse_config(config_json: &str) -> std::result::Result<BlameConfig, String> {
    BlameConfig::from_json(config_json).map_err(|e| format!("Invalid configuration: {}", e))
}

// ---------------------------------------------------------------------------
// Stateless exports
// ---------------------------------------------------------------------------

/// Parse raw `git blame --porcelain` output.
///
/// Returns: JSON object mapping 1-based line numbers to attribution records.
#[wasm_bindgen]
pub fn parse_blame(raw_blame: &str, now_secs: i64) -> String {
    let now = FixedClock::from_secs(now_secs).now();
    to_json(&blame::parse_blame_porcelain(raw_blame, now))
}

/// Relative date ("yesterday", "3 weeks ago", ...) for a commit timestamp.
#[wasm_bindgen]
pub fn format_relative_date(timestamp_secs: i64, now_secs: i64) -> String {
    format::format_relative_date(timestamp_secs, FixedClock::from_secs(now_secs).now())
}

/// Truncate a commit message for display.
#[wasm_bindgen]
pub fn truncate_message(message: &str, max_len: usize) -> String {
    format::truncate(message, max_len)
}

/// Join `git show` and `git name-rev` output into a detailed commit record.
///
/// Returns: JSON DetailedCommitRecord, or { error }.
#[wasm_bindgen]
pub fn parse_commit_detail(
    commit_id: &str,
    show_output: &str,
    name_rev_output: &str,
    now_secs: i64,
) -> String {
    let now = FixedClock::from_secs(now_secs).now();
    match blame::parse_commit_detail(commit_id, show_output, name_rev_output, now) {
        Ok(detail) => to_json(&detail),
        Err(e) => json_error(&e.to_string()),
    }
}

/// Browsable GitHub URL for an `origin` remote URL, if it is a GitHub one.
#[wasm_bindgen]
pub fn github_repo_url(remote_url: &str) -> Option<String> {
    format::github_repo_url(remote_url)
}

/// Web link to one commit, given a URL from [`github_repo_url`].
#[wasm_bindgen]
pub fn commit_url(repo_url: &str, commit_id: &str) -> String {
    format::commit_url(repo_url, commit_id)
}

/// Avatar to show for an author.
///
/// Returns: JSON AvatarSource, or { error } for a bad configuration.
#[wasm_bindgen]
pub fn select_avatar(name: &str, email: &str, config_json: &str, size: u32) -> String {
    match parse_config(config_json) {
        Ok(config) => to_json(&format::select_avatar(name, email, &config, size)),
        Err(e) => json_error(&e),
    }
}

// ---------------------------------------------------------------------------
// Stateful cache for hosts that run git themselves
// ---------------------------------------------------------------------------

/// Blame cache owned by the extension host.
///
/// The host spawns git, feeds the output in with `ingest`, and calls
/// `invalidate` on edit and save. One instance per extension activation.
#[wasm_bindgen]
pub struct BlameCache {
    store: AttributionStore,
}

impl Default for BlameCache {
    fn default() -> Self {
        BlameCache::new()
    }
}

#[wasm_bindgen]
impl BlameCache {
    #[wasm_bindgen(constructor)]
    pub fn new() -> BlameCache {
        BlameCache {
            store: AttributionStore::new(),
        }
    }

    /// Parse blame output for `path`, replacing anything cached for it.
    ///
    /// Returns: JSON line → record map.
    pub fn ingest(&self, path: &str, raw_blame: &str, now_secs: i64) -> String {
        let now = FixedClock::from_secs(now_secs).now();
        let map = self
            .store
            .set(path, blame::parse_blame_porcelain(raw_blame, now));
        to_json(&*map)
    }

    /// Cached JSON line → record map for `path`, if any.
    pub fn get(&self, path: &str) -> Option<String> {
        self.store.get(Path::new(path)).map(|map| to_json(&*map))
    }

    /// Drop the cached map for `path`. Returns whether one was cached.
    pub fn invalidate(&self, path: &str) -> bool {
        self.store.invalidate(Path::new(path))
    }

    #[wasm_bindgen(js_name = invalidateAll)]
    pub fn invalidate_all(&self) {
        self.store.invalidate_all();
    }

    /// Parse and cache commit details for `(commit_id, path)`.
    ///
    /// Returns: JSON DetailedCommitRecord, or { error } (nothing is cached then).
    #[wasm_bindgen(js_name = ingestDetail)]
    pub fn ingest_detail(
        &self,
        commit_id: &str,
        path: &str,
        show_output: &str,
        name_rev_output: &str,
        now_secs: i64,
    ) -> String {
        let now = FixedClock::from_secs(now_secs).now();
        match blame::parse_commit_detail(commit_id, show_output, name_rev_output, now) {
            Ok(detail) => to_json(&*self.store.set_detail(commit_id, path, detail)),
            Err(e) => json_error(&e.to_string()),
        }
    }

    #[wasm_bindgen(js_name = getDetail)]
    pub fn get_detail(&self, commit_id: &str, path: &str) -> Option<String> {
        self.store
            .get_detail(commit_id, Path::new(path))
            .map(|detail| to_json(&*detail))
    }

    /// Inline annotations for the cached file.
    ///
    /// `text` is the current document content, `cursor_line` is 1-based.
    /// Returns: JSON array of { line, text }; empty when nothing is cached.
    pub fn annotations(&self, path: &str, text: &str, cursor_line: u32, config_json: &str) -> String {
        let config = match parse_config(config_json) {
            Ok(c) => c,
            Err(e) => return json_error(&e),
        };
        let lines: Vec<&str> = text.lines().collect();
        let annotations = match self.store.get(Path::new(path)) {
            Some(map) => format::annotations(&map, &lines, cursor_line, &config),
            None => Vec::new(),
        };
        to_json(&annotations)
    }

    /// Code lenses for the cached file.
    ///
    /// Returns: JSON array of { line, title, commitId }; empty when nothing is cached.
    #[wasm_bindgen(js_name = codeLenses)]
    pub fn code_lenses(&self, path: &str, text: &str, config_json: &str) -> String {
        let config = match parse_config(config_json) {
            Ok(c) => c,
            Err(e) => return json_error(&e),
        };
        let lines: Vec<&str> = text.lines().collect();
        let lenses = match self.store.get(Path::new(path)) {
            Some(map) => format::code_lenses(&map, &lines, &config),
            None => Vec::new(),
        };
        to_json(&lenses)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn raw_blame() -> String {
        format!(
            "abcdef0123456789abcdef0123456789abcdef01 1 1 1\nauthor Alice\nauthor-mail <alice@example.com>\nauthor-time {}\nauthor-tz +0000\nsummary Initial commit\nfilename src/main.rs\n\tfn main() {{}}\n",
            NOW - 86_400
        )
    }

    #[test]
    fn test_parse_blame_wasm() {
        let parsed: serde_json::Value = serde_json::from_str(&parse_blame(&raw_blame(), NOW)).unwrap();
        assert!(parsed.is_object());
        assert_eq!(parsed["1"]["author"], "Alice");
        assert_eq!(parsed["1"]["authorEmail"], "alice@example.com");
        assert_eq!(parsed["1"]["commitId"], "abcdef01");
        assert_eq!(parsed["1"]["date"], "yesterday");
    }

    #[test]
    fn test_stateless_derivers_wasm() {
        assert_eq!(format_relative_date(NOW - 7 * 86_400, NOW), "1 week ago");
        assert_eq!(truncate_message("hello world", 5), "hello...");
        assert_eq!(truncate_message("", 5), "No commit message");
        assert_eq!(
            github_repo_url("https://github.com/octo/widgets.git").as_deref(),
            Some("https://github.com/octo/widgets")
        );
    }

    #[test]
    fn test_commit_url_wasm() {
        let repo = github_repo_url("git@github.com:octo/widgets.git").unwrap();
        assert_eq!(
            commit_url(&repo, "abcdef01"),
            "https://github.com/octo/widgets/commit/abcdef01"
        );
    }

    #[test]
    fn test_parse_commit_detail_error_wasm() {
        let parsed: serde_json::Value =
            serde_json::from_str(&parse_commit_detail("abcdef01", "", "main", NOW)).unwrap();
        assert!(parsed.get("error").is_some());
    }

    #[test]
    fn test_select_avatar_wasm() {
        let parsed: serde_json::Value =
            serde_json::from_str(&select_avatar("Grace Hopper", "", "{}", 60)).unwrap();
        assert_eq!(parsed["kind"], "initials");
        assert_eq!(parsed["initials"], "GH");

        let parsed: serde_json::Value =
            serde_json::from_str(&select_avatar("x", "", "{\"avatarStyle\": 3}", 60)).unwrap();
        assert!(parsed.get("error").is_some());
    }

    #[test]
    fn test_blame_cache_lifecycle() {
        let cache = BlameCache::new();
        assert!(cache.get("/ws/src/main.rs").is_none());

        let ingested = cache.ingest("/ws/src/main.rs", &raw_blame(), NOW);
        assert_eq!(cache.get("/ws/src/main.rs").as_deref(), Some(ingested.as_str()));

        assert!(cache.invalidate("/ws/src/main.rs"));
        assert!(cache.get("/ws/src/main.rs").is_none());
    }

    #[test]
    fn test_blame_cache_details() {
        let cache = BlameCache::new();
        let show = "Alice|alice@example.com|Tue Nov 14 22:13:20 2023 +0000|Alice|alice@example.com|Initial commit|";
        let parsed: serde_json::Value =
            serde_json::from_str(&cache.ingest_detail("abcdef01", "/ws/a.rs", show, "main~1", NOW)).unwrap();
        assert_eq!(parsed["branch"], "main");
        assert_eq!(parsed["fullMessage"], "Initial commit");
        assert!(cache.get_detail("abcdef01", "/ws/a.rs").is_some());

        cache.invalidate_all();
        assert!(cache.get_detail("abcdef01", "/ws/a.rs").is_none());
    }

    #[test]
    fn test_blame_cache_annotations() {
        let cache = BlameCache::new();
        let text = "fn main() {}\n";
        assert_eq!(cache.annotations("/ws/src/main.rs", text, 1, ""), "[]");

        cache.ingest("/ws/src/main.rs", &raw_blame(), NOW);
        let parsed: serde_json::Value =
            serde_json::from_str(&cache.annotations("/ws/src/main.rs", text, 1, "{\"showCommit\": true}")).unwrap();
        assert_eq!(parsed[0]["line"], 1);
        assert_eq!(parsed[0]["text"], "Alice, yesterday (abcdef01) • \"Initial commit\"");

        let lenses: serde_json::Value =
            serde_json::from_str(&cache.code_lenses("/ws/src/main.rs", "export function main() {}\n", "")).unwrap();
        assert_eq!(lenses[0]["commitId"], "abcdef01");
    }
}
