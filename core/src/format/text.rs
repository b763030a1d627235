use std::sync::OnceLock;

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::blame::{AttributionRecord, FileAttributionMap, NO_COMMIT_MESSAGE};
use crate::config::BlameConfig;

/// Summary length used in code lens titles.
pub const CODE_LENS_MESSAGE_LENGTH: usize = 50;

/// Inline annotation for one line of the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// 1-based line number.
    pub line: u32,
    pub text: String,
}

/// Code lens shown above a declaration line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeLens {
    /// 1-based line number.
    pub line: u32,
    pub title: String,
    pub commit_id: String,
}

/// Shorten `text` to at most `max_len` characters plus `...`.
/// Empty input yields the "No commit message" placeholder.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.is_empty() {
        return NO_COMMIT_MESSAGE.to_string();
    }
    clip(text, max_len)
}

fn clip(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Build the inline text for one record, e.g.
/// `Alice, 3 days ago (abcdef01) • "Fix parser"`.
pub fn format_annotation(record: &AttributionRecord, config: &BlameConfig) -> String {
    let mut text = String::new();

    if config.show_author {
        text.push_str(&clip(&record.author, config.max_author_length));
    }

    if config.show_date {
        if !text.is_empty() {
            text.push_str(", ");
        }
        text.push_str(&record.date);
    }

    if config.show_commit {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&format!("({})", record.commit_id));
    }

    if config.show_commit_message {
        if !text.is_empty() {
            text.push_str(" • ");
        }
        text.push_str(&format!(
            "\"{}\"",
            truncate(&record.commit_summary, config.max_commit_message_length)
        ));
    }

    text
}

/// Pick the lines to annotate.
///
/// With `show_only_current_line` only `cursor_line` (1-based) is considered,
/// otherwise every line of `lines`. Lines without attribution and blank or
/// whitespace-only lines are skipped.
pub fn annotations(
    attributions: &FileAttributionMap,
    lines: &[&str],
    cursor_line: u32,
    config: &BlameConfig,
) -> Vec<Annotation> {
    if !config.enabled {
        return Vec::new();
    }

    let candidates = if config.show_only_current_line {
        cursor_line..=cursor_line
    } else {
        1..=lines.len() as u32
    };

    candidates
        .filter_map(|line| {
            let record = attributions.get(&line)?;
            let content = lines.get(line.checked_sub(1)? as usize)?;
            if content.trim().is_empty() {
                return None;
            }
            Some(Annotation {
                line,
                text: format_annotation(record, config),
            })
        })
        .collect()
}

/// Code lenses for declaration-looking lines that have attribution.
pub fn code_lenses(
    attributions: &FileAttributionMap,
    lines: &[&str],
    config: &BlameConfig,
) -> Vec<CodeLens> {
    if !config.enabled || !config.show_code_lens {
        return Vec::new();
    }

    lines
        .iter()
        .zip(1u32..)
        .filter(|(content, _)| is_declaration(content.trim()))
        .filter_map(|(_, line)| {
            let record = attributions.get(&line)?;
            Some(CodeLens {
                line,
                title: code_lens_title(record),
                commit_id: record.commit_id.clone(),
            })
        })
        .collect()
}

pub fn code_lens_title(record: &AttributionRecord) -> String {
    format!(
        "{}, {} • \"{}\"",
        record.author,
        record.date,
        truncate(&record.commit_summary, CODE_LENS_MESSAGE_LENGTH)
    )
}

fn declaration_patterns() -> &'static RegexSet {
    static PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        RegexSet::new([
            r"^(export\s+)?(interface|class|type|enum)\s+\w+",
            r"^(export\s+)?(function|const|let|var)\s+\w+",
            r"^(export\s+)?(abstract\s+)?class\s+\w+",
            r"^(export\s+)?default\s+(class|function)",
            r"^import\s+.*from",
            r"^/\*\*",
        ])
        .expect("declaration patterns are valid")
    })
}

fn is_declaration(trimmed: &str) -> bool {
    declaration_patterns().is_match(trimmed)
}
