// src/utils/date.rs

//! Publication date normalization.
//!
//! Stages report dates in whatever shape the page used. Everything is
//! reduced to a calendar date rendered as `YYYY-MM-DD`; a time component,
//! if present, is dropped. Timezone-qualified inputs keep the calendar date
//! of their own offset.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Output format for every normalized date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%d %B %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %b %Y %H:%M",
];

// Year-first forms go before month-first ones. `%Y` also accepts one or two
// digits, so parses landing before year 1000 are discarded in `parse_date`
// and "03/03/24" falls through to `%m/%d/%y`.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y %B %d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%d.%m.%y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b. %d, %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%A %B %d, %Y",
    "%A, %d %B %Y",
    "%a, %d %b %Y",
    "%a %b %d %Y",
];

/// Normalize a raw date string to `YYYY-MM-DD`.
///
/// Returns `None` for missing, blank, or unparsable input. Never panics.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let date = parse_date(raw).or_else(|| {
        let cleaned = clean(raw)?;
        parse_date(&cleaned)
    });

    match date {
        Some(date) => Some(date.format(DATE_FORMAT).to_string()),
        None => {
            log::debug!("Date normalization failed for {raw:?}");
            None
        }
    }
}

/// Try every known representation, most specific first.
fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    OFFSET_FORMATS
        .iter()
        .filter_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date_naive())
        .find(has_full_year)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
                .find(has_full_year)
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .find(has_full_year)
        })
        .or_else(|| parse_compact(s))
        .or_else(|| parse_iso_prefix(s))
}

/// Rejects the years `%Y` produces from one or two digit input.
fn has_full_year(date: &NaiveDate) -> bool {
    date.year() >= 1000
}

/// `20240303`
fn parse_compact(s: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"^(\d{4})(\d{2})(\d{2})$").ok()?;
    let caps = re.captures(s)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

/// An ISO date followed by a time in a shape none of the formats cover,
/// e.g. `2024-03-03T10:00:00.123456789 CET`.
fn parse_iso_prefix(s: &str) -> Option<NaiveDate> {
    let re = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})[T\s]").ok()?;
    let caps = re.captures(s)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

/// Strip ordinal suffixes, "on"/"Published" noise, a leading weekday and a
/// trailing time of day with its zone name.
fn clean(raw: &str) -> Option<String> {
    let ordinal = Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").ok()?;
    let prefix = Regex::new(r"(?i)^(published|posted|updated|date)\s*(on)?\s*:?\s*").ok()?;
    let weekday = Regex::new(
        r"(?i)^(mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)(day|sday|nesday|rsday|urday)?\.?,?\s+",
    )
    .ok()?;
    let sept = Regex::new(r"(?i)\bsept\b\.?").ok()?;
    let zone = Regex::new(r"(?i)\s+(utc|gmt|[a-z]{2,4}t)$").ok()?;
    let time = Regex::new(r"(?i),?\s+(at\s+)?\d{1,2}:\d{2}(:\d{2})?(\s*[ap]\.?m\.?)?$").ok()?;

    let s = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let s = prefix.replace(&s, "");
    let s = weekday.replace(&s, "");
    let s = ordinal.replace_all(&s, "$1");
    let s = sept.replace_all(&s, "Sep");
    let s = zone.replace(&s, "");
    let s = time.replace(&s, "");
    let s = s.trim().to_string();

    (!s.is_empty() && s != raw).then_some(s)
}
