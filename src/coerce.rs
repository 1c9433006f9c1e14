//! Total coercion helpers for loose upstream JSON
//!
//! The upstream API serves numbers as numbers or strings and dates in a
//! handful of ISO-8601 flavors depending on the resource. Every helper here
//! is total: bad input yields the caller's default (or `None`), never an
//! error.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a JSON value into a datetime. String input is trimmed and a trailing
/// `Z` or numeric UTC offset is dropped; a bare date parses as midnight.
pub fn coerce_datetime(value: &Value) -> Option<NaiveDateTime> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    let cleaned = raw.strip_suffix('Z').unwrap_or(raw);
    // "+00:00" style offsets also show up; parse the local part only
    let cleaned = match cleaned.char_indices().rev().find(|(_, c)| *c == '+') {
        Some((idx, _)) if idx >= 10 => &cleaned[..idx],
        _ => cleaned,
    };

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Day-granularity variant of [`coerce_datetime`].
pub fn coerce_date(value: &Value) -> Option<NaiveDate> {
    coerce_datetime(value).map(|dt| dt.date())
}

/// Numeric value as f64, accepting number or numeric-string input.
pub fn coerce_f64(value: &Value, default: f64) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(default),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(default),
        _ => default,
    }
}

/// Integer value as i64, accepting number or numeric-string input. Float
/// input truncates toward zero.
pub fn coerce_i64(value: &Value, default: i64) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(default),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(default)
        }
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_datetime_iso_variants() {
        assert_eq!(
            coerce_datetime(&json!("2025-03-01T10:30:00Z")),
            Some(dt("2025-03-01T10:30:00"))
        );
        assert_eq!(
            coerce_datetime(&json!("2025-03-01T10:30:00.123Z")),
            Some(dt("2025-03-01T10:30:00"))
        );
        assert_eq!(
            coerce_datetime(&json!("2025-03-01 10:30:00")),
            Some(dt("2025-03-01T10:30:00"))
        );
        assert_eq!(
            coerce_datetime(&json!("2025-03-01T10:30:00+00:00")),
            Some(dt("2025-03-01T10:30:00"))
        );
    }

    #[test]
    fn test_datetime_bare_date_is_midnight() {
        assert_eq!(
            coerce_datetime(&json!("2025-03-01")),
            Some(dt("2025-03-01T00:00:00"))
        );
    }

    #[test]
    fn test_datetime_garbage_is_none() {
        assert_eq!(coerce_datetime(&json!("yesterday")), None);
        assert_eq!(coerce_datetime(&json!("")), None);
        assert_eq!(coerce_datetime(&json!(17)), None);
        assert_eq!(coerce_datetime(&json!(null)), None);
    }

    #[test]
    fn test_coerce_date() {
        assert_eq!(
            coerce_date(&json!("2025-03-01T23:59:59Z")),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }

    #[test]
    fn test_f64_number_and_string() {
        assert_eq!(coerce_f64(&json!(12.5), 0.0), 12.5);
        assert_eq!(coerce_f64(&json!("12.5"), 0.0), 12.5);
        assert_eq!(coerce_f64(&json!(" 3 "), 0.0), 3.0);
        assert_eq!(coerce_f64(&json!("abc"), -1.0), -1.0);
        assert_eq!(coerce_f64(&json!(null), -1.0), -1.0);
    }

    #[test]
    fn test_i64_number_string_and_float() {
        assert_eq!(coerce_i64(&json!(7), 0), 7);
        assert_eq!(coerce_i64(&json!("7"), 0), 7);
        assert_eq!(coerce_i64(&json!(7.9), 0), 7);
        assert_eq!(coerce_i64(&json!("7.9"), 0), 7);
        assert_eq!(coerce_i64(&json!("x"), -1), -1);
        assert_eq!(coerce_i64(&json!([1]), -1), -1);
    }
}
