//! Pure presentation transforms used by note list and editor views.
//!
//! # Invariants
//! - Every function here is deterministic for its inputs; callers pass the
//!   reference "now" explicitly.

use chrono::{DateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const PREVIEW_MAX_CHARS: usize = 40;
const PREVIEW_EMPTY: &str = "No additional text";
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// First line of `content`, truncated to 40 characters with `...`.
pub fn preview(content: &str) -> String {
    if content.is_empty() {
        return PREVIEW_EMPTY.to_string();
    }
    let first_line = content.split('\n').next().unwrap_or_default();
    if first_line.chars().count() > PREVIEW_MAX_CHARS {
        let mut truncated: String = first_line.chars().take(PREVIEW_MAX_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        first_line.to_string()
    }
}

/// Compact list date relative to `now`.
///
/// - under one day old: `HH:MM`
/// - one day: `Yesterday`
/// - under a week: weekday name
/// - otherwise: `Mon D`
pub fn format_list_date<Tz>(timestamp: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let elapsed_ms = now
        .clone()
        .signed_duration_since(timestamp.clone())
        .num_milliseconds();
    match elapsed_ms.div_euclid(MILLIS_PER_DAY) {
        0 => timestamp.format("%H:%M").to_string(),
        1 => "Yesterday".to_string(),
        days if days < 7 => timestamp.format("%A").to_string(),
        _ => timestamp.format("%b %-d").to_string(),
    }
}

/// Long editor header date, e.g. `Monday, January 1, 2024 at 09:05 AM`.
pub fn format_editor_date<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%A, %B %-d, %Y at %I:%M %p").to_string()
}

/// Editor footer counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorStats {
    pub words: usize,
    pub characters: usize,
}

impl EditorStats {
    pub fn of(content: &str) -> Self {
        let trimmed = content.trim();
        let words = if trimmed.is_empty() {
            0
        } else {
            WHITESPACE_RE.split(trimmed).count()
        };
        Self {
            words,
            characters: content.chars().count(),
        }
    }
}

impl Display for EditorStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.words == 0 {
            f.write_str("0 words")
        } else {
            write!(f, "{} words, {} characters", self.words, self.characters)
        }
    }
}
