use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder shown when a commit has no summary line.
pub const NO_COMMIT_MESSAGE: &str = "No commit message";

/// Branch shown when the containing ref is not known.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Attribution for a single line from `git blame --porcelain` output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttributionRecord {
    pub author: String,
    pub author_email: String,
    /// Relative date ("3 days ago"), rendered when the record was built.
    pub date: String,
    /// Unix epoch seconds.
    pub author_timestamp: i64,
    /// Short (8 character) commit id.
    pub commit_id: String,
    pub commit_summary: String,
    pub branch: String,
}

/// 1-based line number → attribution for every line git attributed.
pub type FileAttributionMap = BTreeMap<u32, AttributionRecord>;

/// Full commit metadata for the hover and detail panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCommitRecord {
    #[serde(flatten)]
    pub record: AttributionRecord,
    pub full_message: String,
    /// `%ad` exactly as git printed it.
    pub author_date_raw: String,
    pub committer_name: String,
    pub committer_email: String,
}

impl std::ops::Deref for DetailedCommitRecord {
    type Target = AttributionRecord;

    fn deref(&self) -> &AttributionRecord {
        &self.record
    }
}
