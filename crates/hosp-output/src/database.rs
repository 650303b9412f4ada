//! Relational sink backed by SQLite.

use std::time::Instant;

use polars::prelude::{AnyValue, Column, DataFrame, DataType};
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info, info_span, warn};

use hosp_common::any_to_string;
use hosp_model::{DatabaseConfig, PersistMode};

use crate::error::{OutputError, Result};

/// Opens the destination and runs the connection test.
///
/// Any failure here is an [`OutputError::Connectivity`].
pub fn open_database(config: &DatabaseConfig) -> Result<Connection> {
    let connectivity = |source| OutputError::Connectivity {
        path: config.path.clone(),
        source,
    };
    let conn = Connection::open(&config.path).map_err(connectivity)?;
    conn.busy_timeout(config.busy_timeout).map_err(connectivity)?;
    test_connection(&conn).map_err(connectivity)?;
    info!(path = %config.path.display(), "database connection established");
    Ok(conn)
}

/// `SELECT 1` round trip.
pub fn test_connection(conn: &Connection) -> rusqlite::Result<()> {
    let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
    debug!(result = one, "connection test");
    Ok(())
}

/// Quotes an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQLite column affinity for a frame dtype.
pub fn sql_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Boolean => "INTEGER",
        dtype if dtype.is_integer() => "INTEGER",
        dtype if dtype.is_float() => "REAL",
        _ => "TEXT",
    }
}

/// Converts one cell to an SQLite value. Dates are stored as ISO text.
pub fn sql_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Integer(i64::from(b)),
        AnyValue::Int8(v) => Value::Integer(i64::from(v)),
        AnyValue::Int16(v) => Value::Integer(i64::from(v)),
        AnyValue::Int32(v) => Value::Integer(i64::from(v)),
        AnyValue::Int64(v) => Value::Integer(v),
        AnyValue::UInt8(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt16(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt32(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => Value::Integer(v),
            Err(_) => Value::Real(v as f64),
        },
        AnyValue::Float32(v) if v.is_nan() => Value::Null,
        AnyValue::Float32(v) => Value::Real(f64::from(v)),
        AnyValue::Float64(v) if v.is_nan() => Value::Null,
        AnyValue::Float64(v) => Value::Real(v),
        AnyValue::String(s) => Value::Text(s.to_string()),
        AnyValue::StringOwned(s) => Value::Text(s.to_string()),
        other => Value::Text(any_to_string(other)),
    }
}

fn create_table_sql(frame: &DataFrame, table: &str, mode: PersistMode) -> String {
    let columns: Vec<String> = frame
        .get_columns()
        .iter()
        .map(|column| format!("{} {}", quote_ident(column.name()), sql_type(column.dtype())))
        .collect();
    let if_not_exists = match mode {
        PersistMode::Replace => "",
        PersistMode::Append => "IF NOT EXISTS ",
    };
    format!(
        "CREATE TABLE {if_not_exists}{} ({})",
        quote_ident(table),
        columns.join(", ")
    )
}

fn insert_sql(frame: &DataFrame, table: &str) -> String {
    let names: Vec<String> = frame
        .get_columns()
        .iter()
        .map(|column| quote_ident(column.name()))
        .collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|idx| format!("?{idx}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Writes `frame` into `table` and returns the number of rows inserted.
///
/// [`PersistMode::Replace`] drops any existing table first; there is no
/// backup. The whole write runs in one transaction, so a failure leaves the
/// table as it was.
pub fn persist(
    conn: &mut Connection,
    frame: &DataFrame,
    table: &str,
    mode: PersistMode,
) -> Result<usize> {
    let span = info_span!("persist", table, rows = frame.height(), ?mode);
    let _guard = span.enter();
    let start = Instant::now();

    if frame.width() == 0 {
        return Err(OutputError::EmptySchema {
            table: table.to_string(),
        });
    }

    let tx = conn
        .transaction()
        .map_err(|e| OutputError::database(table, e))?;
    if mode == PersistMode::Replace {
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
            .map_err(|e| OutputError::database(table, e))?;
    }
    tx.execute_batch(&create_table_sql(frame, table, mode))
        .map_err(|e| OutputError::database(table, e))?;

    let columns: &[Column] = frame.get_columns();
    {
        let mut stmt = tx
            .prepare(&insert_sql(frame, table))
            .map_err(|e| OutputError::database(table, e))?;
        let mut row = Vec::with_capacity(columns.len());
        for idx in 0..frame.height() {
            row.clear();
            for column in columns {
                row.push(sql_value(column.get(idx)?));
            }
            stmt.execute(params_from_iter(row.iter()))
                .map_err(|e| OutputError::database(table, e))?;
        }
    }
    tx.commit().map_err(|e| OutputError::database(table, e))?;

    if frame.height() == 0 {
        warn!(table, "persisted an empty table");
    }
    debug!(
        table,
        rows = frame.height(),
        duration_ms = start.elapsed().as_millis(),
        "table persisted"
    );
    Ok(frame.height())
}

/// Number of rows currently stored in `table`.
pub fn table_row_count(conn: &Connection, table: &str) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    let count: i64 = conn
        .query_row(&sql, [], |row| row.get(0))
        .map_err(|e| OutputError::database(table, e))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("LOS"), "\"LOS\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn maps_dtypes() {
        assert_eq!(sql_type(&DataType::Int64), "INTEGER");
        assert_eq!(sql_type(&DataType::Boolean), "INTEGER");
        assert_eq!(sql_type(&DataType::Float64), "REAL");
        assert_eq!(sql_type(&DataType::String), "TEXT");
        assert_eq!(sql_type(&DataType::Date), "TEXT");
    }

    #[test]
    fn converts_cells() {
        assert_eq!(sql_value(AnyValue::Null), Value::Null);
        assert_eq!(sql_value(AnyValue::Float64(f64::NAN)), Value::Null);
        assert_eq!(sql_value(AnyValue::Boolean(true)), Value::Integer(1));
        assert_eq!(sql_value(AnyValue::String("E1")), Value::Text("E1".to_string()));
        assert_eq!(sql_value(AnyValue::Date(19_723)), Value::Text("2024-01-01".to_string()));
    }

    #[test]
    fn builds_statements() {
        let frame = DataFrame::new(vec![
            Column::new("encounter_id".into(), vec!["E1"]),
            Column::new("LOS".into(), vec![4i64]),
        ])
        .unwrap();
        assert_eq!(
            create_table_sql(&frame, "encounters", PersistMode::Append),
            "CREATE TABLE IF NOT EXISTS \"encounters\" (\"encounter_id\" TEXT, \"LOS\" INTEGER)"
        );
        assert_eq!(
            insert_sql(&frame, "encounters"),
            "INSERT INTO \"encounters\" (\"encounter_id\", \"LOS\") VALUES (?1, ?2)"
        );
    }
}
