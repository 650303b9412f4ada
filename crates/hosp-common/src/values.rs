//! Polars `AnyValue` conversion helpers.
//!
//! Source extracts arrive with whatever dtypes CSV inference picked, so the
//! transform stages read cells through these helpers instead of assuming a
//! column type.

use chrono::NaiveDate;
use polars::prelude::*;

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null`, formats floats without trailing zeros
/// and renders dates as `YYYY-MM-DD`.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use hosp_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int64(42)), "42");
/// assert_eq!(any_to_string(AnyValue::String("E1")), "E1");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Date(days) => days_to_date(days)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Converts `AnyValue` to a trimmed `String`, returning `None` if it is empty.
///
/// Join keys go through this so `" E1 "` and `"E1"` match and blank keys
/// never match anything.
pub fn any_to_key(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use hosp_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(10.0), "10");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Converts an `AnyValue` to `i64`, returning `None` for non-integer or null values.
///
/// Floats are truncated.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) => Some(v as i64),
        AnyValue::Float64(v) => Some(v as i64),
        AnyValue::String(s) => parse_i64(s),
        AnyValue::StringOwned(s) => parse_i64(&s),
        _ => None,
    }
}

/// Interprets a documentation flag cell.
///
/// Booleans pass through, numbers are true when non-zero, and text accepts
/// the usual yes/no spellings. Anything else is `None`.
pub fn any_to_flag(value: AnyValue<'_>) -> Option<bool> {
    match value {
        AnyValue::Boolean(b) => Some(b),
        AnyValue::String(s) => parse_flag(s),
        AnyValue::StringOwned(s) => parse_flag(&s),
        other => any_to_f64(other).map(|v| v != 0.0),
    }
}

/// Parses a yes/no style flag.
pub fn parse_flag(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        _ => parse_f64(trimmed).map(|v| v != 0.0),
    }
}

/// Converts a Polars date cell (days since the Unix epoch) to a `NaiveDate`.
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(chrono::Duration::days(i64::from(days)))
}

/// Converts a `NaiveDate` to the Polars physical date representation.
pub fn date_to_days(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as i32
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parses a string as `i64`, returning `None` for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_integers() {
        assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
        assert_eq!(any_to_string(AnyValue::Int64(-7)), "-7");
        assert_eq!(any_to_string(AnyValue::UInt32(0)), "0");
    }

    #[test]
    fn test_any_to_string_floats() {
        assert_eq!(any_to_string(AnyValue::Float64(1.5)), "1.5");
        assert_eq!(any_to_string(AnyValue::Float64(1.0)), "1");
        assert_eq!(any_to_string(AnyValue::Float64(120.0)), "120");
    }

    #[test]
    fn test_any_to_string_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(any_to_string(AnyValue::Date(date_to_days(date))), "2024-01-05");
    }

    #[test]
    fn test_any_to_key() {
        assert_eq!(any_to_key(AnyValue::Null), None);
        assert_eq!(any_to_key(AnyValue::String("  ")), None);
        assert_eq!(any_to_key(AnyValue::String(" E1 ")), Some("E1".to_string()));
        assert_eq!(any_to_key(AnyValue::Int64(7)), Some("7".to_string()));
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(-0.0), "-0");
        assert_eq!(format_numeric(2.25), "2.25");
        assert_eq!(format_numeric(100.0), "100");
    }

    #[test]
    fn test_any_to_f64() {
        assert_eq!(any_to_f64(AnyValue::Null), None);
        assert_eq!(any_to_f64(AnyValue::Int32(42)), Some(42.0));
        assert_eq!(any_to_f64(AnyValue::String("2.5")), Some(2.5));
        assert_eq!(any_to_f64(AnyValue::String("?")), None);
    }

    #[test]
    fn test_any_to_i64() {
        assert_eq!(any_to_i64(AnyValue::Float64(3.9)), Some(3));
        assert_eq!(any_to_i64(AnyValue::String("100")), Some(100));
        assert_eq!(any_to_i64(AnyValue::String("invalid")), None);
    }

    #[test]
    fn test_any_to_flag() {
        assert_eq!(any_to_flag(AnyValue::Boolean(true)), Some(true));
        assert_eq!(any_to_flag(AnyValue::Int64(0)), Some(false));
        assert_eq!(any_to_flag(AnyValue::Int64(1)), Some(true));
        assert_eq!(any_to_flag(AnyValue::String("Yes")), Some(true));
        assert_eq!(any_to_flag(AnyValue::String("N")), Some(false));
        assert_eq!(any_to_flag(AnyValue::String("?")), None);
        assert_eq!(any_to_flag(AnyValue::Null), None);
    }

    #[test]
    fn test_date_days_round_trip() {
        let date = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        assert_eq!(date_to_days(date), -1);
        assert_eq!(days_to_date(-1), Some(date));
    }
}
