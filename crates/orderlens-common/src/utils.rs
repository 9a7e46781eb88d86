//! Shared utility functions.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{OrderLensError, Result};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parses a timestamp cell. Blank cells and the usual null spellings map to `None`.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` (optionally with a `T` separator and
/// fractional seconds) and bare `YYYY-MM-DD` dates, which become midnight.
pub fn parse_timestamp(raw: &str) -> Result<Option<NaiveDateTime>> {
    let value = raw.trim();
    if is_null_token(value) {
        return Ok(None);
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(parsed));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| OrderLensError::input(format!("unrecognized timestamp '{value}'")))
}

/// Whether a raw cell spells a missing value.
pub fn is_null_token(value: &str) -> bool {
    matches!(value, "" | "NaT" | "NaN" | "nan" | "null" | "NULL" | "None")
}

/// Parses a monetary cell. Null spellings and non-finite numbers map to `None`.
pub fn parse_amount(raw: &str) -> Result<Option<f64>> {
    let value = raw.trim();
    if is_null_token(value) {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(finite_amount)
        .map_err(|_| OrderLensError::input(format!("unrecognized amount '{value}'")))
}

/// Drops `NaN` and infinities so they count as missing values.
pub fn finite_amount(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Formats a float with a fixed number of decimals, or `n/a` when undefined.
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "n/a".to_string(),
    }
}
