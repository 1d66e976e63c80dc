//! Column projection of harvested records.
//!
//! Records are flattened so nested objects become dotted column names
//! (`price_info.price`). A projection keeps the requested columns in the
//! requested order, minus any column that no record carries.

use harvest_core::Record;
use serde_json::{Map, Value};

/// Separator between the segments of a flattened column name.
pub const COLUMN_SEPARATOR: char = '.';

/// Records reduced to a fixed set of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl Projection {
    /// Columns present in the output, in output order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// One object per record, keyed by [`columns`](Self::columns).
    #[must_use]
    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Project `records` onto `columns`.
///
/// Requested columns that appear in no record are dropped. A row missing a
/// kept column gets `null` there. Arrays are not expanded.
#[must_use]
pub fn project(records: &[Record], columns: &[String]) -> Projection {
    let flattened: Vec<Map<String, Value>> = records
        .iter()
        .map(|record| flatten(record.fields()))
        .collect();

    let mut kept: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        if kept.contains(column) {
            continue;
        }
        if flattened.iter().any(|row| row.contains_key(column)) {
            kept.push(column.clone());
        } else {
            tracing::debug!(column = %column, "column absent from every record, dropping");
        }
    }

    let rows = flattened
        .into_iter()
        .map(|mut row| {
            kept.iter()
                .map(|column| (column.clone(), row.remove(column).unwrap_or(Value::Null)))
                .collect()
        })
        .collect();

    Projection {
        columns: kept,
        rows,
    }
}

/// Flatten nested objects into dotted keys.
///
/// Empty objects contribute no column.
#[must_use]
pub fn flatten(fields: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(&mut out, None, fields);
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, fields: &Map<String, Value>) {
    for (key, value) in fields {
        let name = match prefix {
            Some(prefix) => format!("{prefix}{COLUMN_SEPARATOR}{key}"),
            None => key.clone(),
        };

        match value {
            Value::Object(nested) => flatten_into(out, Some(&name), nested),
            _ => {
                out.insert(name, value.clone());
            }
        }
    }
}
