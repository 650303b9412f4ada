//! Admission/discharge date parsing.
//!
//! Source extracts carry dates as free text. A cell is either missing
//! (empty or null), a date in one of the accepted layouts, or something we
//! cannot read; the normalizer treats the last two very differently.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::AnyValue;

use hosp_common::days_to_date;

/// Classification of one date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCell {
    Missing,
    Valid(NaiveDate),
    Invalid,
}

impl DateCell {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DateCell::Valid(date) => Some(date),
            DateCell::Missing | DateCell::Invalid => None,
        }
    }

    /// Classifies a cell of any dtype.
    pub fn from_any(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => DateCell::Missing,
            AnyValue::Date(days) => days_to_date(days).map_or(DateCell::Invalid, DateCell::Valid),
            AnyValue::String(s) => Self::from_text(s),
            AnyValue::StringOwned(s) => Self::from_text(&s),
            // Compact dates whose column was inferred as integer.
            AnyValue::Int32(v) => Self::from_text(&v.to_string()),
            AnyValue::Int64(v) => Self::from_text(&v.to_string()),
            AnyValue::UInt32(v) => Self::from_text(&v.to_string()),
            AnyValue::UInt64(v) => Self::from_text(&v.to_string()),
            _ => DateCell::Invalid,
        }
    }

    pub fn from_text(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return DateCell::Missing;
        }
        parse_date(trimmed).map_or(DateCell::Invalid, DateCell::Valid)
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y", // US: 01/15/2024
    "%d-%b-%Y", // 15-Jan-2024
    "%d %b %Y", // 15 Jan 2024
    "%b %d, %Y", // Jan 15, 2024
    "%Y%m%d",   // Compact: 20240115
];

/// Parses a date, truncating datetimes to their calendar day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}
