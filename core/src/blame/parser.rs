use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::types::{AttributionRecord, FileAttributionMap, NO_COMMIT_MESSAGE, UNKNOWN_BRANCH};
use crate::format::format_relative_date;

/// Length of the commit id kept on each record.
pub const SHORT_SHA_LEN: usize = 8;

/// Metadata gathered so far for one commit. Porcelain output only prints a
/// commit's metadata the first time the commit appears, so this lives for the
/// whole scan and is reused by every later line range of the same commit.
#[derive(Debug, Default)]
struct PendingCommit {
    author: Option<String>,
    author_email: Option<String>,
    author_time: Option<i64>,
    summary: Option<String>,
}

impl PendingCommit {
    fn to_record(&self, sha: &str, now: DateTime<Utc>) -> Option<AttributionRecord> {
        let author = self.author.as_deref().filter(|a| !a.is_empty())?;
        let author_time = self.author_time?;

        Some(AttributionRecord {
            author: author.to_string(),
            author_email: self.author_email.clone().unwrap_or_default(),
            date: format_relative_date(author_time, now),
            author_timestamp: author_time,
            commit_id: short_sha(sha).to_string(),
            commit_summary: self
                .summary
                .clone()
                .unwrap_or_else(|| NO_COMMIT_MESSAGE.to_string()),
            branch: UNKNOWN_BRANCH.to_string(),
        })
    }
}

/// Parse `git blame --porcelain` output into a line → attribution map.
///
/// The porcelain format looks like:
/// ```text
/// <40-char sha> <orig_line> <final_line> [<num_lines>]
/// author <name>
/// author-mail <<email>>
/// author-time <epoch>
/// author-tz <tz>
/// committer ...
/// summary <text>
/// previous <sha> <filename>
/// filename <path>
/// \t<line content>
/// ```
///
/// Every content line (tab-prefixed) becomes one entry keyed by the
/// `final_line` of the header above it. Lines whose commit has no author or
/// author time yet are left out of the map rather than filled with blanks.
/// `now` is the reference point for the relative `date` field.
pub fn parse_blame_porcelain(input: &str, now: DateTime<Utc>) -> FileAttributionMap {
    let mut attributions = FileAttributionMap::new();
    let mut commits: HashMap<&str, PendingCommit> = HashMap::new();
    let mut current: Option<(&str, u32)> = None;

    for line in input.lines() {
        if line.starts_with('\t') {
            let Some((sha, final_line)) = current else {
                continue;
            };
            if let Some(record) = commits.get(sha).and_then(|c| c.to_record(sha, now)) {
                attributions.insert(final_line, record);
            }
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        if let Some((sha, final_line)) = parse_header(line) {
            commits.entry(sha).or_default();
            current = Some((sha, final_line));
            continue;
        }

        let Some(pending) = current.and_then(|(sha, _)| commits.get_mut(sha)) else {
            continue;
        };

        if let Some(val) = line.strip_prefix("author-mail ") {
            pending.author_email = Some(strip_angle_brackets(val).to_string());
        } else if let Some(val) = line.strip_prefix("author-time ") {
            pending.author_time = val.trim().parse().ok();
        } else if let Some(val) = line.strip_prefix("author ") {
            pending.author = Some(val.to_string());
        } else if let Some(val) = line.strip_prefix("summary ") {
            pending.summary = Some(val.to_string());
        }
        // committer-*, author-tz, previous, boundary, filename: not needed
    }

    attributions
}

/// Recognize a porcelain header line, returning the full sha and the line's
/// number in the final file.
///
/// A header starts with 40 lowercase hex characters followed by at least two
/// space-separated numbers (orig_line and final_line).
fn parse_header(line: &str) -> Option<(&str, u32)> {
    let mut parts = line.split_whitespace();
    let sha = parts.next()?;
    if sha.len() != 40 || !sha.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }

    let _orig_line: u32 = parts.next()?.parse().ok()?;
    let final_line: u32 = parts.next()?.parse().ok()?;
    Some((sha, final_line))
}

fn strip_angle_brackets(email: &str) -> &str {
    email.trim().trim_start_matches('<').trim_end_matches('>')
}

fn short_sha(sha: &str) -> &str {
    sha.get(..SHORT_SHA_LEN).unwrap_or(sha)
}
