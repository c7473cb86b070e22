//! JSON Lines writer
//!
//! Writes collected records and metadata one JSON document per line.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write rows as JSON Lines, replacing any existing file
///
/// Parent directories are created as needed. Returns the number of rows
/// written.
pub fn write_jsonl<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<usize> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(create_file(path)?);

    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(rows.len())
}

/// Write a value as pretty-printed JSON
pub fn write_json_pretty<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(create_file(path)?);

    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::output(format!(
                    "Failed to create directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
    }

    File::create(path)
        .map_err(|e| Error::output(format!("Failed to create '{}': {e}", path.display())))
}
