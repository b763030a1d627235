use chrono::{DateTime, Utc};

use super::types::{AttributionRecord, DetailedCommitRecord, UNKNOWN_BRANCH};
use crate::error::{BlameError, Result};
use crate::format::format_relative_date;

/// `git show` pretty format matching [`parse_commit_detail`].
pub const SHOW_FORMAT: &str = "--format=%an|%ae|%ad|%cn|%ce|%s|%B";

/// Git's default `%ad` layout, e.g. `Tue Nov 14 22:13:20 2023 +0000`.
const GIT_DEFAULT_DATE: &str = "%a %b %d %H:%M:%S %Y %z";

/// Join the output of the `git show` metadata query and the `git name-rev`
/// query into one detailed record.
///
/// The first five fields are split on `|`. The subject and body are split at
/// the first `|` whose remainder starts with the text before it, since `%B`
/// always begins with `%s`; pipes in either one stay intact.
pub fn parse_commit_detail(
    commit_id: &str,
    show_output: &str,
    name_rev_output: &str,
    now: DateTime<Utc>,
) -> Result<DetailedCommitRecord> {
    let show_output = show_output.trim();
    if show_output.is_empty() {
        return Err(BlameError::Parse(format!(
            "empty commit metadata for {commit_id}"
        )));
    }

    let mut parts: Vec<&str> = show_output.splitn(6, '|').collect();
    if parts.len() == 6 {
        let (subject, body) = split_subject_body(parts[5]);
        parts.truncate(5);
        parts.extend([subject, body]);
    }
    let field = |i: usize| parts.get(i).copied().unwrap_or_default();

    let author_date_raw = field(2).to_string();
    let (author_timestamp, date) = match parse_git_date(&author_date_raw) {
        Some(ts) => (ts, format_relative_date(ts, now)),
        None => (0, author_date_raw.clone()),
    };

    let summary = field(5).to_string();
    let full_message = match field(6).trim() {
        "" => summary.clone(),
        body => body.to_string(),
    };

    let author = match field(0) {
        "" => "Unknown".to_string(),
        name => name.to_string(),
    };

    Ok(DetailedCommitRecord {
        record: AttributionRecord {
            author,
            author_email: field(1).to_string(),
            date,
            author_timestamp,
            commit_id: commit_id.to_string(),
            commit_summary: summary,
            branch: branch_name(name_rev_output),
        },
        full_message,
        author_date_raw,
        committer_name: field(3).to_string(),
        committer_email: field(4).to_string(),
    })
}

/// Split `%s|%B`. Falls back to the first `|` when the body does not repeat
/// the subject.
fn split_subject_body(rest: &str) -> (&str, &str) {
    let first_line = rest.split('\n').next().unwrap_or_default();
    let at = first_line
        .match_indices('|')
        .map(|(i, _)| i)
        .find(|&i| rest[i + 1..].starts_with(&rest[..i]))
        .or_else(|| rest.find('|'));
    match at {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest, ""),
    }
}

/// Clean up `git name-rev --name-only` output: drop a trailing `~N`
/// ancestor offset, and fall back to "unknown" when nothing is left.
pub fn branch_name(name_rev_output: &str) -> String {
    let name = name_rev_output.trim();
    let name = match name.rsplit_once('~') {
        Some((base, offset))
            if !offset.is_empty() && offset.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    };

    if name.is_empty() {
        UNKNOWN_BRANCH.to_string()
    } else {
        name.to_string()
    }
}

fn parse_git_date(raw: &str) -> Option<i64> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    DateTime::parse_from_str(&normalized, GIT_DEFAULT_DATE)
        .ok()
        .map(|dt| dt.timestamp())
}
