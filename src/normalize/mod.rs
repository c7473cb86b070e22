//! Normalization module
//!
//! Pure transforms that turn collected records into tabular rows.
//!
//! # Overview
//!
//! - `flatten_record` - nested objects become `parent.child` columns
//! - `explode_field` - an array field becomes one row per element
//! - `normalize_columns` - column names become snake_case ASCII
//! - `to_table` - rows aligned to a shared column list

mod columns;
mod flatten;

pub use columns::{column_mapping, normalize_column_name, normalize_columns};
pub use flatten::{
    explode_field, flatten_record, flatten_records, to_table, Table, DEFAULT_SEPARATOR,
    SCALAR_COLUMN,
};
