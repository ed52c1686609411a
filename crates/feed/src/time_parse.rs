// ABOUTME: Flexible date parsing for RSS pubDate values.
// ABOUTME: Tries common feed formats with chrono, then falls back to the dateparser crate.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses a timestamp string and returns its calendar date.
///
/// The date is taken in the timestamp's own offset, so
/// `Mon, 15 Jan 2024 23:30:00 -0500` yields 2024-01-15, not the UTC day.
/// Returns None when no format matches.
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Atom-style timestamps, including fractional seconds
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // The RSS 2.0 format; chrono also accepts the obsolete US zone names here
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    if let Some(date) = parse_with_named_timezone(s) {
        return Some(date);
    }

    let formats_with_tz = [
        // Single digit day: "Mon, 2 Jan 2006 15:04:05 -0700"
        "%a, %e %b %Y %H:%M:%S %z",
        // Without weekday: "02 Jan 2006 15:04:05 -0700"
        "%d %b %Y %H:%M:%S %z",
        // Without seconds: "Mon, 02 Jan 2006 15:04 -0700"
        "%a, %d %b %Y %H:%M %z",
        // ISO-like compact offset: "2006-01-02T15:04:05-0700"
        "%Y-%m-%dT%H:%M:%S%z",
        // Space-separated with offset: "2006-01-02 15:04:05 -07:00"
        "%Y-%m-%d %H:%M:%S %:z",
    ];

    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }

    let formats_naive = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%a, %d %b %Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
        "%e %b %Y %H:%M:%S",
    ];

    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.date());
        }
    }

    let formats_date = [
        "%Y-%m-%d",     // 2024-01-05
        "%a, %d %b %Y", // Fri, 05 Jan 2024
        "%d %b %Y",     // 05 Jan 2024
        "%b %d, %Y",    // Jan 05, 2024
        "%d %B %Y",     // 05 January 2024
        "%B %d, %Y",    // January 05, 2024
    ];

    for fmt in &formats_date {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // Catch-all for looser formats; naive inputs are read as UTC
    dateparser::parse_with_timezone(s, &Utc)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Strips a trailing zone abbreviation chrono can't read and parses the rest.
/// The offset is irrelevant for the calendar date, so only the name is matched.
fn parse_with_named_timezone(s: &str) -> Option<NaiveDate> {
    const ZONE_NAMES: &[&str] = &[
        "GMT", "UTC", "EST", "EDT", "CST", "CDT", "MST", "MDT", "PST", "PDT", "AKST", "AKDT",
        "HST", "AST", "ADT", "NST", "NDT", "WET", "WEST", "CET", "CEST", "EET", "EEST", "BST",
        "IST", "JST", "KST", "AEST", "AEDT", "AWST", "NZST", "NZDT",
    ];

    let (base, zone) = s.rsplit_once(' ')?;
    if !ZONE_NAMES.contains(&zone) {
        return None;
    }
    let base = base.trim_end();

    let formats = [
        "%a, %d %b %Y %H:%M:%S",
        "%a, %e %b %Y %H:%M:%S",
        "%a, %d %b %Y %H:%M",
        "%d %b %Y %H:%M:%S",
        "%e %b %Y %H:%M:%S",
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(base, fmt).ok())
        .map(|naive| naive.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(parse_flexible_date("2023-06-15T14:30:00Z"), date(2023, 6, 15));
        assert_eq!(
            parse_flexible_date("2023-06-15T14:30:00.123+02:00"),
            date(2023, 6, 15)
        );
    }

    #[test]
    fn test_rfc2822_keeps_local_date() {
        assert_eq!(
            parse_flexible_date("Mon, 15 Jan 2024 23:30:00 -0500"),
            date(2024, 1, 15)
        );
        assert_eq!(
            parse_flexible_date("Tue, 16 Jan 2024 00:15:00 +0200"),
            date(2024, 1, 16)
        );
    }

    #[test]
    fn test_named_timezone() {
        assert_eq!(
            parse_flexible_date("Mon, 02 Jan 2006 15:04:05 MST"),
            date(2006, 1, 2)
        );
        assert_eq!(
            parse_flexible_date("Wed, 10 Jul 2024 09:00:00 CEST"),
            date(2024, 7, 10)
        );
    }

    #[test]
    fn test_single_digit_day() {
        assert_eq!(
            parse_flexible_date("Mon, 2 Jan 2006 15:04:05 -0700"),
            date(2006, 1, 2)
        );
    }

    #[test]
    fn test_naive_and_date_only() {
        assert_eq!(parse_flexible_date("2006-01-02 15:04:05"), date(2006, 1, 2));
        assert_eq!(parse_flexible_date("2024-03-09"), date(2024, 3, 9));
        assert_eq!(parse_flexible_date("05 Jan 2024"), date(2024, 1, 5));
        assert_eq!(parse_flexible_date("January 05, 2024"), date(2024, 1, 5));
    }

    #[test]
    fn test_dateparser_fallback() {
        assert_eq!(parse_flexible_date("2021-05-01 12:30"), date(2021, 5, 1));
    }

    #[test]
    fn test_empty_returns_none() {
        assert!(parse_flexible_date("").is_none());
        assert!(parse_flexible_date("   ").is_none());
    }

    #[test]
    fn test_invalid_returns_none() {
        assert!(parse_flexible_date("not a date").is_none());
        assert!(parse_flexible_date("Mon, 45 Foo 2024 99:99:99 +0000").is_none());
    }
}
