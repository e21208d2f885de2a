//! Field normalization for scraped text
//!
//! Numeric cleanup, calendar dates, sentiment labels and review body assembly.

use crate::constants::review::TRUNCATION_MARKER;
use crate::constants::{detail::SYNOPSIS_CREDIT, MONTHS, SENTIMENT_SCORES};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A numeric detail field, or its original text
///
/// Serializes as a bare JSON number or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Integer(u64),
    Decimal(f64),
    Text(String),
}

/// Drops a fixed-width label prefix such as `"Ranked #"`
///
/// Offsets count characters, not bytes.
pub fn strip_label(text: &str, prefix_len: usize) -> &str {
    match text.char_indices().nth(prefix_len) {
        Some((offset, _)) => &text[offset..],
        None => "",
    }
}

/// Parses a count with thousands separators, e.g. `"12,345"`
pub fn parse_count(text: &str) -> Option<u64> {
    text.trim().replace(',', "").parse().ok()
}

/// Parses a decimal score, e.g. `"8.75"`
pub fn parse_score(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Builds a count field, keeping the text when asked to or when it is not a number
pub fn count_field(text: &str, keep_text: bool) -> Number {
    if keep_text {
        return Number::Text(text.to_string());
    }
    match parse_count(text) {
        Some(value) => Number::Integer(value),
        None => {
            tracing::warn!("Keeping non-numeric count '{}' as text", text);
            Number::Text(text.to_string())
        }
    }
}

/// Builds a score field, keeping the text when asked to or when it is not a number
pub fn score_field(text: &str, keep_text: bool) -> Number {
    if keep_text {
        return Number::Text(text.to_string());
    }
    match parse_score(text) {
        Some(value) => Number::Decimal(value),
        None => {
            tracing::warn!("Keeping non-numeric score '{}' as text", text);
            Number::Text(text.to_string())
        }
    }
}

/// Maps a review verdict label to its score; unknown labels yield None
pub fn sentiment_score(label: &str) -> Option<u8> {
    let label = label.trim();
    SENTIMENT_SCORES
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, score)| *score)
}

/// Parses `"Mon D, YYYY"` (comma optional) into `(year, month, day)`
///
/// Tokens after the year, such as a time of day, are ignored.
///
/// # Examples
///
/// ```
/// use anime_harvest::extract::normalize::parse_calendar_date;
///
/// assert_eq!(parse_calendar_date("Jan 5, 2020"), Some((2020, 1, 5)));
/// assert_eq!(parse_calendar_date("Smarch 5, 2020"), None);
/// ```
pub fn parse_calendar_date(text: &str) -> Option<(i32, u32, u32)> {
    let cleaned = text.replace(',', "");
    let mut parts = cleaned.split_whitespace();

    let month = parts.next()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;

    let month = MONTHS.iter().position(|m| *m == month)? as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, day)?;
    Some((year, month, day))
}

/// Seconds since the epoch at UTC midnight of the given date
pub fn unix_timestamp((year, month, day): (i32, u32, u32)) -> Option<i64> {
    let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).timestamp())
}

/// Flattens a synopsis onto one line and removes the rewrite credit
pub fn clean_synopsis(text: &str) -> String {
    text.replace('\n', " ").replace(SYNOPSIS_CREDIT, "")
}

/// Rebuilds a review body collapsed behind a "read more" affordance
///
/// With a hidden fragment, the visible text loses its trailing ellipsis and the
/// fragment's raw text is appended. Without one the visible text is the whole body.
pub fn merge_truncated(visible: &str, hidden: Option<&str>) -> String {
    match hidden {
        Some(rest) => {
            let prefix = visible.trim_end();
            let prefix = prefix.strip_suffix(TRUNCATION_MARKER).unwrap_or(prefix);
            format!("{}{}", prefix, rest)
        }
        None => visible.to_string(),
    }
}

/// First `words` words of a text, with an ellipsis when cut
pub fn preview(text: &str, words: usize) -> String {
    let head: Vec<&str> = text.split(' ').take(words).collect();
    let head = head.join(" ").replace('\n', "");
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head
    }
}
