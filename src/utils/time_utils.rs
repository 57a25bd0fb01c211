//! Time utilities for astronomical calculations
//!
//! Parses the UTC string forms accepted on the command line and in kernel
//! `@` date literals, and converts them to "formal" UTC seconds past J2000
//! (every day is 86400 s; leap seconds are applied separately by the
//! leapseconds model).

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{EphemerisError, Result};

/// Unix timestamp of 2000-01-01T12:00:00 UTC
const J2000_UNIX_SECONDS: i64 = 946_728_000;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%jT%H:%M:%S%.f",
    "%Y-%j %H:%M:%S%.f",
    "%Y-%jT%H:%M",
    "%Y-%b-%d %H:%M:%S%.f",
    "%Y-%b-%dT%H:%M:%S%.f",
    "%Y-%b-%d/%H:%M:%S%.f",
    "%Y-%b-%d %H:%M",
    "%Y-%b-%d/%H:%M",
    "%Y %b %d %H:%M:%S%.f",
    "%Y %b %d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%j", "%Y-%b-%d", "%Y %b %d"];

/// Parse a UTC calendar string
///
/// Accepted forms include ISO calendar (`2021-10-27T12:00:00`), ISO day of
/// year (`2021-300T12:00:00`), month abbreviations (`2021-OCT-27 12:00:00`,
/// `1972-JAN-1`, `2015 JUL 14 12:00`) and bare dates. Fractional seconds are optional. A trailing
/// `Z` or `UTC` is ignored.
pub fn parse_utc(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    let s = trimmed
        .strip_suffix("UTC")
        .or_else(|| trimmed.strip_suffix('Z'))
        .unwrap_or(trimmed)
        .trim();

    if s.is_empty() {
        return Err(EphemerisError::InvalidTime("empty time string".to_string()));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }

    Err(EphemerisError::InvalidTime(format!(
        "unrecognized UTC string '{input}'"
    )))
}

/// Formal UTC seconds past 2000-01-01T12:00:00 (no leap seconds counted)
pub fn utc_seconds_past_j2000(dt: &NaiveDateTime) -> f64 {
    let utc = dt.and_utc();
    (utc.timestamp() - J2000_UNIX_SECONDS) as f64 + utc.timestamp_subsec_nanos() as f64 * 1e-9
}

/// Parse a UTC string straight to formal seconds past J2000
pub fn parse_utc_seconds(input: &str) -> Result<f64> {
    parse_utc(input).map(|dt| utc_seconds_past_j2000(&dt))
}
