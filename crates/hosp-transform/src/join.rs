//! Order-preserving left joins.
//!
//! Keys are compared by their trimmed text form so an integer key in one
//! extract matches the same id stored as text in another. Blank keys never
//! match. Output rows follow the left table's order; when a left row matches
//! several right rows they appear in the right table's source order.

use std::collections::HashMap;

use polars::prelude::{DataFrame, IdxCa, IdxSize, NewChunkedArray};
use tracing::warn;

use hosp_common::{column_keys, column_names};
use hosp_model::columns::JOIN_SUFFIX;
use hosp_model::{CardinalityWarning, SchemaError};

use crate::error::Result;

/// One side of a join: the frame, its key column and a table name for errors.
#[derive(Debug, Clone, Copy)]
pub struct JoinSide<'a> {
    pub table: &'a str,
    pub data: &'a DataFrame,
    pub key: &'a str,
}

impl<'a> JoinSide<'a> {
    pub fn new(table: &'a str, data: &'a DataFrame, key: &'a str) -> Self {
        Self { table, data, key }
    }
}

/// What to do with the right-hand key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RightKey {
    /// Keep it (keys with different names, e.g. code → diagnosis_code).
    Keep,
    /// Drop it (same-named keys collapse into the left column).
    Drop,
}

/// Row pairing computed before any column is materialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinPlan {
    pub left: Vec<usize>,
    pub right: Vec<Option<usize>>,
    /// Distinct right keys occurring more than once.
    pub duplicate_keys: usize,
}

impl JoinPlan {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn matched(&self) -> usize {
        self.right.iter().filter(|idx| idx.is_some()).count()
    }
}

/// Pairs every left row with its matching right rows.
pub fn plan_left_join(left_keys: &[Option<String>], right_keys: &[Option<String>]) -> JoinPlan {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, key) in right_keys.iter().enumerate() {
        if let Some(key) = key {
            index.entry(key.as_str()).or_default().push(idx);
        }
    }
    let duplicate_keys = index.values().filter(|rows| rows.len() > 1).count();

    let mut plan = JoinPlan {
        left: Vec::with_capacity(left_keys.len()),
        right: Vec::with_capacity(left_keys.len()),
        duplicate_keys,
    };
    for (left_idx, key) in left_keys.iter().enumerate() {
        match key.as_deref().and_then(|key| index.get(key)) {
            Some(rows) => {
                for right_idx in rows {
                    plan.left.push(left_idx);
                    plan.right.push(Some(*right_idx));
                }
            }
            None => {
                plan.left.push(left_idx);
                plan.right.push(None);
            }
        }
    }
    plan
}

/// Result of a left join.
#[derive(Debug, Clone)]
pub struct JoinOutput {
    pub data: DataFrame,
    pub warning: Option<CardinalityWarning>,
}

/// Left-joins `right` onto `left`, retaining every left row.
///
/// Unmatched rows get nulls in every right-hand column. Right columns whose
/// names already exist on the left are suffixed with `_right`. Duplicate
/// right keys fan out and produce a [`CardinalityWarning`].
pub fn left_join(
    name: &str,
    left: JoinSide<'_>,
    right: JoinSide<'_>,
    right_key: RightKey,
) -> Result<JoinOutput> {
    SchemaError::check(left.table, &column_names(left.data), &[left.key])?;
    SchemaError::check(right.table, &column_names(right.data), &[right.key])?;

    let plan = plan_left_join(
        &column_keys(left.data, left.key)?,
        &column_keys(right.data, right.key)?,
    );

    let left_idx = IdxCa::from_vec(
        "left_idx".into(),
        plan.left.iter().map(|idx| *idx as IdxSize).collect(),
    );
    let right_idx = IdxCa::from_iter_options(
        "right_idx".into(),
        plan.right.iter().map(|idx| idx.map(|idx| idx as IdxSize)),
    );

    let right_frame = match right_key {
        RightKey::Keep => right.data.clone(),
        RightKey::Drop => right.data.drop(right.key)?,
    };
    let mut right_taken = right_frame.take(&right_idx)?;
    let left_names = column_names(left.data);
    for column in column_names(&right_taken) {
        if left_names.contains(&column) {
            let renamed = format!("{column}{JOIN_SUFFIX}");
            right_taken.rename(&column, renamed.as_str().into())?;
        }
    }
    let data = left.data.take(&left_idx)?.hstack(right_taken.get_columns())?;

    let extra_rows = plan.len().saturating_sub(left.data.height());
    let warning = if plan.duplicate_keys > 0 {
        let warning = CardinalityWarning {
            join: name.to_string(),
            key: right.key.to_string(),
            duplicate_keys: plan.duplicate_keys,
            extra_rows,
        };
        warn!(
            join = name,
            key = right.key,
            duplicate_keys = warning.duplicate_keys,
            extra_rows,
            "right side of join has duplicate keys; rows fan out"
        );
        Some(warning)
    } else {
        None
    };

    Ok(JoinOutput { data, warning })
}
