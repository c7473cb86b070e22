//! Progress and log sinks
//!
//! The controller never writes to the console itself. It reports through a
//! [`ProgressSink`] and a [`LogSink`] owned by the caller.

use super::types::AbortReason;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info, warn};

/// Progress after a non-empty page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Non-empty pages collected so far
    pub pages: u64,
    /// Records collected so far
    pub records: usize,
}

/// Structured events emitted by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    /// A run started
    Started {
        /// Endpoint URL
        url: String,
    },
    /// A page request is about to be sent
    RequestIssued {
        /// Full URL with query string
        url: String,
        /// Page number requested
        cursor: u64,
    },
    /// A recoverable failure will be retried after `wait`
    RetryScheduled {
        /// Status that triggered the retry
        status: u16,
        /// Attempt number for this page, starting at 1
        attempt: u32,
        /// Configured budget
        max_attempts: u32,
        /// Backoff before the retry
        wait: Duration,
    },
    /// The API returned an empty page
    Exhausted {
        /// Page number that came back empty
        cursor: u64,
    },
    /// The run stopped early
    Aborted {
        /// Why the run stopped
        reason: AbortReason,
    },
    /// Final counts
    Summary {
        /// Records collected
        records: usize,
        /// Metadata entries collected
        metadata_pages: usize,
    },
}

/// Receives progress updates
pub trait ProgressSink: Send + Sync {
    /// Called once per non-empty page
    fn on_page(&self, event: ProgressEvent);
}

/// Receives structured log events
pub trait LogSink: Send + Sync {
    /// Called for every controller event
    fn emit(&self, event: &ExtractionEvent);
}

// ============================================================================
// Tracing sinks
// ============================================================================

/// Log sink that forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn emit(&self, event: &ExtractionEvent) {
        match event {
            ExtractionEvent::Started { url } => {
                info!(url = %url, "Starting extraction");
            }
            ExtractionEvent::RequestIssued { url, cursor } => {
                info!(url = %url, cursor, "Requesting page");
            }
            ExtractionEvent::RetryScheduled {
                status,
                attempt,
                max_attempts,
                wait,
            } => {
                warn!(
                    status,
                    attempt,
                    max_attempts,
                    wait_secs = wait.as_secs_f64(),
                    "HTTP {status}, attempt {attempt}/{max_attempts}, waiting {:?}",
                    wait
                );
            }
            ExtractionEvent::Exhausted { cursor } => {
                info!(cursor, "No data on page {cursor}, extraction complete");
            }
            ExtractionEvent::Aborted { reason } => {
                error!(reason = %reason, "Extraction aborted");
            }
            ExtractionEvent::Summary {
                records,
                metadata_pages,
            } => {
                info!(records, metadata_pages, "Extraction summary");
            }
        }
    }
}

/// Progress sink that logs each page through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_page(&self, event: ProgressEvent) {
        info!(
            pages = event.pages,
            records = event.records,
            "Pages extracted: {}",
            event.pages
        );
    }
}

/// Progress sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_page(&self, _event: ProgressEvent) {}
}

// ============================================================================
// In-memory sink
// ============================================================================

/// Sink that keeps every event in memory
///
/// Implements both sink traits, so one instance can observe a whole run.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ExtractionEvent>>,
    progress: Mutex<Vec<ProgressEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Log events received so far
    pub fn events(&self) -> Vec<ExtractionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Progress events received so far
    pub fn progress(&self) -> Vec<ProgressEvent> {
        self.progress
            .lock()
            .map(|progress| progress.clone())
            .unwrap_or_default()
    }

    /// Attempt numbers of every scheduled retry, in order
    pub fn retry_attempts(&self) -> Vec<u32> {
        self.events()
            .iter()
            .filter_map(|event| match event {
                ExtractionEvent::RetryScheduled { attempt, .. } => Some(*attempt),
                _ => None,
            })
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, event: &ExtractionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl ProgressSink for MemorySink {
    fn on_page(&self, event: ProgressEvent) {
        if let Ok(mut progress) = self.progress.lock() {
            progress.push(event);
        }
    }
}
