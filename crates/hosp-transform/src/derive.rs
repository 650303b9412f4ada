//! Derived encounter fields and export sanitization.

use std::time::Instant;

use polars::prelude::{AnyValue, Column, DataFrame, DataType};
use tracing::{debug, info_span};

use hosp_common::{any_to_f64, any_to_i64, any_to_string, has_column};
use hosp_model::DelayBucket;
use hosp_model::columns::{DELAY_BUCKET, DISCHARGE_SUMMARY_DELAY_HOURS, PLACEHOLDER_VALUE};

use crate::error::Result;

/// Adds the `delay_bucket` column.
///
/// A frame without `discharge_summary_delay_hours` gets `unbucketed` on
/// every row.
pub fn add_delay_buckets(df: &DataFrame) -> Result<DataFrame> {
    let mut buckets = Vec::with_capacity(df.height());
    if has_column(df, DISCHARGE_SUMMARY_DELAY_HOURS) {
        let hours = df.column(DISCHARGE_SUMMARY_DELAY_HOURS)?;
        for idx in 0..df.height() {
            buckets.push(DelayBucket::from_hours(any_to_f64(hours.get(idx)?)).label());
        }
    } else {
        buckets.resize(df.height(), DelayBucket::Unbucketed.label());
    }

    let mut out = df.clone();
    out.with_column(Column::new(DELAY_BUCKET.into(), buckets))?;
    Ok(out)
}

/// Replaces placeholders and fills every null for export.
///
/// String cells equal to `?` after trimming become empty, as do null strings.
/// Null numbers become 0, null booleans false, and date columns are rendered
/// as ISO text with an empty string for null.
pub fn sanitize(df: &DataFrame) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());
    let mut placeholders = 0usize;
    let mut filled = 0usize;

    for column in df.get_columns() {
        filled += column.null_count();
        let name = column.name().clone();
        let dtype = column.dtype().clone();
        let height = column.len();

        let sanitized = match &dtype {
            DataType::String => {
                let mut values = Vec::with_capacity(height);
                for idx in 0..height {
                    let value = any_to_string(column.get(idx)?);
                    if value.trim() == PLACEHOLDER_VALUE {
                        placeholders += 1;
                        values.push(String::new());
                    } else {
                        values.push(value);
                    }
                }
                Column::new(name, values)
            }
            DataType::Boolean => {
                let mut values = Vec::with_capacity(height);
                for idx in 0..height {
                    values.push(matches!(column.get(idx)?, AnyValue::Boolean(true)));
                }
                Column::new(name, values)
            }
            DataType::Date => {
                let mut values = Vec::with_capacity(height);
                for idx in 0..height {
                    values.push(any_to_string(column.get(idx)?));
                }
                Column::new(name, values)
            }
            dtype if dtype.is_integer() => {
                let mut values = Vec::with_capacity(height);
                for idx in 0..height {
                    values.push(any_to_i64(column.get(idx)?).unwrap_or(0));
                }
                Column::new(name, values).cast(dtype)?
            }
            dtype if dtype.is_float() => {
                let mut values = Vec::with_capacity(height);
                for idx in 0..height {
                    let value = any_to_f64(column.get(idx)?).filter(|v| !v.is_nan());
                    values.push(value.unwrap_or(0.0));
                }
                Column::new(name, values).cast(dtype)?
            }
            _ => column.clone(),
        };
        columns.push(sanitized);
    }

    debug!(placeholders, filled, "sanitized frame");
    Ok(DataFrame::new(columns)?)
}

/// Runs the derivation stage: delay buckets, then sanitization.
pub fn derive(df: &DataFrame) -> Result<DataFrame> {
    let span = info_span!("derive", rows = df.height());
    let _guard = span.enter();
    let start = Instant::now();

    let bucketed = add_delay_buckets(df)?;
    let out = sanitize(&bucketed)?;

    debug!(
        rows = out.height(),
        columns = out.width(),
        duration_ms = start.elapsed().as_millis(),
        "derivation complete"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    #[test]
    fn buckets_every_row() {
        let df = DataFrame::new(vec![Column::new(
            DISCHARGE_SUMMARY_DELAY_HOURS.into(),
            vec![Some(0.0), Some(0.5), Some(72.0), None, Some(-1.0), Some(20_000.0)],
        )])
        .unwrap();
        let out = add_delay_buckets(&df).unwrap();
        let labels: Vec<String> = (0..out.height())
            .map(|idx| any_to_string(out.column(DELAY_BUCKET).unwrap().get(idx).unwrap()))
            .collect();
        assert_eq!(
            labels,
            vec!["No delay", "0-24h", "24-72h", "unbucketed", "unbucketed", "unbucketed"]
        );
        assert!(!has_column(&df, DELAY_BUCKET));
    }

    #[test]
    fn missing_delay_column_is_unbucketed() {
        let df = DataFrame::new(vec![Column::new("encounter_id".into(), vec!["E1", "E2"])]).unwrap();
        let out = add_delay_buckets(&df).unwrap();
        let buckets = out.column(DELAY_BUCKET).unwrap();
        assert_eq!(buckets.get(1).unwrap(), AnyValue::String("unbucketed"));
    }

    #[test]
    fn sanitize_fills_by_dtype() {
        let dates = Series::new("admission_date".into(), vec![Some(19_723i32), None])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![
            Column::new("name".into(), vec![Some(" ? "), None]),
            Column::new("LOS".into(), vec![None, Some(4i64)]),
            Column::new("hours".into(), vec![Some(f64::NAN), None]),
            Column::new("flag".into(), vec![None, Some(true)]),
            dates.into(),
        ])
        .unwrap();

        let out = sanitize(&df).unwrap();
        for column in out.get_columns() {
            assert_eq!(column.null_count(), 0, "{}", column.name());
        }
        assert_eq!(out.column("name").unwrap().get(0).unwrap(), AnyValue::String(""));
        assert_eq!(out.column("LOS").unwrap().get(0).unwrap(), AnyValue::Int64(0));
        assert_eq!(out.column("hours").unwrap().get(0).unwrap(), AnyValue::Float64(0.0));
        assert_eq!(out.column("flag").unwrap().get(0).unwrap(), AnyValue::Boolean(false));
        let admitted = out.column("admission_date").unwrap();
        assert_eq!(admitted.get(0).unwrap(), AnyValue::String("2024-01-01"));
        assert_eq!(admitted.get(1).unwrap(), AnyValue::String(""));
        assert_eq!(df.column("LOS").unwrap().null_count(), 1);
    }

    #[test]
    fn sanitize_keeps_integer_width() {
        let df = DataFrame::new(vec![Column::new("n".into(), vec![Some(1i32), None])]).unwrap();
        let out = sanitize(&df).unwrap();
        assert_eq!(out.column("n").unwrap().dtype(), &DataType::Int32);
    }
}
