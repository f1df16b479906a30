//! Small helpers shared across the pipeline.
//!
//! - Clock access in the configured time zone
//! - Timestamp formatting for the message trailer
//! - String truncation for log previews

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Display;

/// Current time in `tz`.
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Format a check time as `YYYY-MM-DD HH:MM:SS ABBR`, e.g.
/// `2026-10-16 07:05:00 MDT`.
pub fn format_timestamp<T>(at: &DateTime<T>) -> String
where
    T: TimeZone,
    T::Offset: Display,
{
    at.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes, backing off to the nearest
/// character boundary, with `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
