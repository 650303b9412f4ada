//! DataFrame access helpers.

use polars::prelude::{AnyValue, DataFrame, PolarsResult};

use crate::values::{any_to_key, any_to_string};

/// Extract the join-key form of every value in a column.
pub fn column_keys(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?;
    let mut keys = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        keys.push(any_to_key(column.get(idx)?));
    }
    Ok(keys)
}

/// Owned column names, in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Returns true if the frame has a column with exactly this name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// A hashable rendering of one full row; nulls are distinct from empty text.
pub fn row_fingerprint(df: &DataFrame, idx: usize) -> PolarsResult<Vec<Option<String>>> {
    let mut cells = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let value = column.get(idx)?;
        cells.push(match value {
            AnyValue::Null => None,
            other => Some(any_to_string(other)),
        });
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, DataFrame};

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("id".into(), vec![Some("E1"), None, Some(" E3 ")]),
            Column::new("n".into(), vec![1i64, 2, 3]),
        ])
        .unwrap()
    }

    #[test]
    fn reads_keys_and_values() {
        let df = frame();
        assert_eq!(
            column_keys(&df, "id").unwrap(),
            vec![Some("E1".to_string()), None, Some("E3".to_string())]
        );
        assert!(column_keys(&df, "missing").is_err());
    }

    #[test]
    fn fingerprint_keeps_nulls_apart_from_empty() {
        let df = DataFrame::new(vec![Column::new(
            "a".into(),
            vec![Some(""), None, Some("")],
        )])
        .unwrap();
        assert_eq!(row_fingerprint(&df, 0).unwrap(), row_fingerprint(&df, 2).unwrap());
        assert_ne!(row_fingerprint(&df, 0).unwrap(), row_fingerprint(&df, 1).unwrap());
    }

    #[test]
    fn column_lookup() {
        let df = frame();
        assert!(has_column(&df, "id"));
        assert!(!has_column(&df, "ID"));
        assert_eq!(column_names(&df), vec!["id", "n"]);
    }
}
