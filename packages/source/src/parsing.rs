//! Shared parsing utilities for incident fields.
//!
//! Times arrive in more than one convention within the same export
//! (`02:30 PM`, `14:30:00`, `2:30 p. m.`, full timestamps), dates in a few
//! day-first and ISO layouts, and coordinates sometimes with a decimal
//! comma.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike as _};
use incident_map_source_models::TemporalConfig;

/// Parses a time-of-day value into an hour (0-23).
///
/// Tries every `time_formats` entry, then every `datetime_formats` entry
/// (taking the time part). Spanish meridiem markers (`a. m.`, `p.m.`) are
/// rewritten to `AM`/`PM` first. Returns `None` if nothing matches.
#[must_use]
pub fn parse_hour(value: &str, config: &TemporalConfig) -> Option<u8> {
    let value = normalize_meridiem(value);
    if value.is_empty() {
        return None;
    }

    let time = config
        .time_formats
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&value, format).ok())
        .or_else(|| {
            config
                .datetime_formats
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(&value, format).ok())
                .map(|dt| dt.time())
        })?;

    u8::try_from(time.hour()).ok()
}

/// Parses a date value.
///
/// Tries every `date_formats` entry, then every `datetime_formats` entry
/// (taking the date part). Returns `None` if nothing matches.
#[must_use]
pub fn parse_date(value: &str, config: &TemporalConfig) -> Option<NaiveDate> {
    let value = normalize_meridiem(value);
    if value.is_empty() {
        return None;
    }

    config
        .date_formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&value, format).ok())
        .or_else(|| {
            config
                .datetime_formats
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(&value, format).ok())
                .map(|dt| dt.date())
        })
}

/// Parses a coordinate. Returns `None` if missing, unparseable, non-finite,
/// or zero.
///
/// A single decimal comma (`-75,5812`) is accepted.
#[must_use]
pub fn parse_coordinate(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let parsed = value
        .parse::<f64>()
        .ok()
        .or_else(|| {
            (value.matches(',').count() == 1 && !value.contains('.'))
                .then(|| value.replace(',', "."))
                .and_then(|v| v.parse::<f64>().ok())
        })?;
    if !parsed.is_finite() || parsed == 0.0 {
        return None;
    }
    Some(parsed)
}

/// Rewrites Spanish meridiem markers to the `AM`/`PM` tokens `chrono`
/// understands and collapses repeated whitespace.
fn normalize_meridiem(value: &str) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    let lower = collapsed.to_ascii_lowercase();

    for (suffixes, replacement) in [
        (&["a. m.", "a.m.", "a. m", "a.m", "a m"][..], "AM"),
        (&["p. m.", "p.m.", "p. m", "p.m", "p m"][..], "PM"),
    ] {
        for suffix in suffixes {
            if let Some(stripped) = lower.strip_suffix(suffix) {
                return format!("{} {replacement}", collapsed[..stripped.len()].trim_end());
            }
        }
    }

    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_source;

    fn config() -> TemporalConfig {
        default_source().temporal
    }

    #[test]
    fn parses_strict_twelve_hour() {
        let c = config();
        assert_eq!(parse_hour("02:30 PM", &c), Some(14));
        assert_eq!(parse_hour("12:05 AM", &c), Some(0));
        assert_eq!(parse_hour("12:05 PM", &c), Some(12));
        assert_eq!(parse_hour("11:59 pm", &c), Some(23));
    }

    #[test]
    fn parses_mixed_formats() {
        let c = config();
        assert_eq!(parse_hour("14:30:00", &c), Some(14));
        assert_eq!(parse_hour("7:05", &c), Some(7));
        assert_eq!(parse_hour("03:15:22 PM", &c), Some(15));
        assert_eq!(parse_hour("2:30 p. m.", &c), Some(14));
        assert_eq!(parse_hour("9:00 a.m.", &c), Some(9));
        assert_eq!(parse_hour("2019-01-05 18:45:00", &c), Some(18));
    }

    #[test]
    fn rejects_unparseable_time() {
        let c = config();
        assert_eq!(parse_hour("", &c), None);
        assert_eq!(parse_hour("mediodía", &c), None);
        assert_eq!(parse_hour("25:00", &c), None);
    }

    #[test]
    fn parses_dates() {
        let c = config();
        let expected = NaiveDate::from_ymd_opt(2019, 1, 5);
        assert_eq!(parse_date("2019-01-05", &c), expected);
        assert_eq!(parse_date("05/01/2019", &c), expected);
        assert_eq!(parse_date("05/01/2019 12:00:00 AM", &c), expected);
        assert_eq!(parse_date("2019-01-05T00:00:00", &c), expected);
        assert_eq!(parse_date("2019-01-05T00:00:00.000", &c), expected);
    }

    #[test]
    fn unparseable_date_is_none() {
        let c = config();
        assert_eq!(parse_date("sin fecha", &c), None);
        assert_eq!(parse_date("", &c), None);
        assert_eq!(parse_date("2019-13-40", &c), None);
    }

    #[test]
    fn parses_coordinates() {
        assert_eq!(parse_coordinate("-75.5812"), Some(-75.5812));
        assert_eq!(parse_coordinate(" 6,2442 "), Some(6.2442));
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("0"), None);
        assert_eq!(parse_coordinate("NaN"), None);
        assert_eq!(parse_coordinate("1,234.5"), None);
    }
}
