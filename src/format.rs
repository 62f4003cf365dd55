//! Display formatting helpers.

use chrono::{DateTime, Utc};

/// Format a duration in seconds as `MM:SS`.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format a timestamp as a short date, e.g. `Jan 5, 2026`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}
