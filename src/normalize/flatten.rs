//! Nested and multi-valued field flattening
//!
//! Turns JSON records into flat rows: nested objects become prefixed keys,
//! and an array field can be exploded into one row per element.

use crate::types::{JsonObject, JsonValue};
use serde_json::Value;
use std::collections::HashSet;

/// Separator used between parent and child keys
pub const DEFAULT_SEPARATOR: &str = ".";

/// Key used when a record is not an object
pub const SCALAR_COLUMN: &str = "value";

/// Flatten nested objects into `parent{sep}child` keys
///
/// Arrays and scalars are kept as leaf values. An empty nested object
/// becomes a null leaf so the column is not lost. A record that is not an
/// object is stored under [`SCALAR_COLUMN`].
pub fn flatten_record(record: &JsonValue, sep: &str) -> JsonObject {
    let mut row = JsonObject::new();
    match record {
        Value::Object(map) => flatten_into(&mut row, None, map, sep),
        other => {
            row.insert(SCALAR_COLUMN.to_string(), other.clone());
        }
    }
    row
}

/// Flatten every record
pub fn flatten_records(records: &[JsonValue], sep: &str) -> Vec<JsonObject> {
    records
        .iter()
        .map(|record| flatten_record(record, sep))
        .collect()
}

fn flatten_into(row: &mut JsonObject, prefix: Option<&str>, map: &JsonObject, sep: &str) {
    for (key, value) in map {
        let column = match prefix {
            Some(prefix) => format!("{prefix}{sep}{key}"),
            None => key.clone(),
        };

        match value {
            Value::Object(child) if !child.is_empty() => {
                flatten_into(row, Some(&column), child, sep);
            }
            Value::Object(_) => {
                row.insert(column, Value::Null);
            }
            leaf => {
                row.insert(column, leaf.clone());
            }
        }
    }
}

/// Explode a multi-valued field into one row per element
///
/// Object elements are flattened under `field{sep}key`; scalar elements are
/// stored under `field`. Rows where the field is missing, null or an empty
/// array are kept once with the field set to null. A non-array object value
/// is flattened in place like a single element.
pub fn explode_field(rows: &[JsonObject], field: &str, sep: &str) -> Vec<JsonObject> {
    let mut exploded = Vec::with_capacity(rows.len());

    for row in rows {
        let mut base = row.clone();
        let value = base.remove(field);

        match value {
            Some(Value::Array(items)) if !items.is_empty() => {
                for item in items {
                    let mut out = base.clone();
                    insert_element(&mut out, field, item, sep);
                    exploded.push(out);
                }
            }
            Some(Value::Array(_) | Value::Null) | None => {
                base.insert(field.to_string(), Value::Null);
                exploded.push(base);
            }
            Some(other) => {
                insert_element(&mut base, field, other, sep);
                exploded.push(base);
            }
        }
    }

    exploded
}

fn insert_element(row: &mut JsonObject, field: &str, element: JsonValue, sep: &str) {
    match element {
        Value::Object(map) if !map.is_empty() => flatten_into(row, Some(field), &map, sep),
        Value::Object(_) => {
            row.insert(field.to_string(), Value::Null);
        }
        scalar => {
            row.insert(field.to_string(), scalar);
        }
    }
}

/// Rows aligned to a shared column list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names in first-seen order
    pub columns: Vec<String>,
    /// One value per column for every row; missing cells are null
    pub rows: Vec<Vec<JsonValue>>,
}

impl Table {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, if it exists
    pub fn column(&self, name: &str) -> Option<Vec<&JsonValue>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}

/// Align flat rows into a [`Table`]
pub fn to_table(rows: &[JsonObject]) -> Table {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();

    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }

    let rows = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Table { columns, rows }
}
