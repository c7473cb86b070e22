//! Run report
//!
//! A small JSON summary written next to the extracted data.

use crate::extract::{ExtractionResult, Termination};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of one extraction run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Endpoint URL
    pub base_url: String,
    /// How the run ended
    pub termination: Termination,
    /// Non-empty pages collected
    pub pages: u64,
    /// Records collected
    pub records: usize,
    /// Metadata entries collected
    pub metadata_pages: usize,
    /// Rows written after flattening, when flattening was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    /// Cursor the run stopped at
    pub final_cursor: u64,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run ended
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Build a report from a finished run
    pub fn new(
        base_url: impl Into<String>,
        result: &ExtractionResult,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            termination: result.termination.clone(),
            pages: result.pages,
            records: result.records.len(),
            metadata_pages: result.metadata.len(),
            rows: None,
            final_cursor: result.final_cursor,
            started_at,
            finished_at,
        }
    }

    /// Record the number of flattened rows written
    #[must_use]
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Run duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
