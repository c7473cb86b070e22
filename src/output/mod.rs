//! Output module
//!
//! Caller-side persistence used by the CLI.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing records and metadata as JSON Lines
//! - Summarizing a run in a JSON report

mod report;
mod writer;

pub use report::RunReport;
pub use writer::{write_json_pretty, write_jsonl};
