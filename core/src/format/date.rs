use chrono::{DateTime, Utc};

const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Render a commit time relative to `now`.
///
/// Elapsed time is rounded *up* to whole days, then bucketed:
/// 1 day is "yesterday", under a week is "N days ago", under 30 days counts
/// weeks, under 365 days counts 30-day months, and anything older is an
/// absolute `M/D/YYYY` date (UTC). Future timestamps are measured the same
/// way as past ones.
pub fn format_relative_date(timestamp_secs: i64, now: DateTime<Utc>) -> String {
    let then_ms = timestamp_secs.saturating_mul(1000);
    let elapsed_ms = now.timestamp_millis().saturating_sub(then_ms).unsigned_abs();
    let days = elapsed_ms.div_ceil(MS_PER_DAY);

    match days {
        1 => "yesterday".to_string(),
        0..=6 => format!("{days} days ago"),
        7..=29 => plural(days / 7, "week"),
        30..=364 => plural(days / 30, "month"),
        _ => absolute_date(timestamp_secs),
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n > 1 {
        format!("{n} {unit}s ago")
    } else {
        format!("{n} {unit} ago")
    }
}

fn absolute_date(timestamp_secs: i64) -> String {
    match DateTime::from_timestamp(timestamp_secs, 0) {
        Some(dt) => dt.format("%-m/%-d/%Y").to_string(),
        None => timestamp_secs.to_string(),
    }
}
