//! Extraction state machine types
//!
//! States, abort reasons, the mutable run state and the returned result.

use crate::types::JsonValue;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// State of the extraction state machine
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    /// Next step issues a request for the current cursor
    Fetching,
    /// Next step sleeps, then retries the same cursor
    Backoff {
        /// Status that triggered the retry
        status: u16,
        /// How long to wait before retrying
        wait: Duration,
    },
    /// The API returned an empty page
    Done,
    /// The run stopped early
    Aborted(AbortReason),
}

impl RunState {
    /// Check if no further step will change the state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted(_))
    }
}

/// Why a run stopped before the API was exhausted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbortReason {
    /// A non-retryable HTTP status
    Unrecoverable {
        /// HTTP status code
        status: u16,
    },
    /// Network-level failure or an unreadable body
    Transport {
        /// Failure description
        cause: String,
    },
    /// A page kept failing with recoverable statuses
    RetryBudgetExhausted {
        /// Status of the last failed attempt
        status: u16,
        /// Configured budget
        max_attempts: u32,
    },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecoverable { status } => write!(f, "unrecoverable HTTP error {status}"),
            Self::Transport { cause } => write!(f, "transport error: {cause}"),
            Self::RetryBudgetExhausted {
                status,
                max_attempts,
            } => write!(
                f,
                "maximum of {max_attempts} attempts exceeded (last status {status})"
            ),
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// The API signalled exhaustion
    Done,
    /// The run stopped early; collected data is still returned
    Aborted(AbortReason),
}

impl Termination {
    /// Check if the run finished cleanly
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if the run was aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

/// Mutable state of a single run
///
/// Owned by the controller; nothing else mutates it.
#[derive(Debug, Clone)]
pub struct ExtractionState {
    /// Recoverable failures for the current cursor
    pub attempt: u32,
    /// Page number of the next request
    pub cursor: u64,
    /// Records from every non-empty page, in cursor order
    pub records_total: Vec<JsonValue>,
    /// Metadata from every successful request, in cursor order
    pub metadata_total: Vec<JsonValue>,
    /// Non-empty pages collected
    pub pages: u64,
    /// Current state machine state
    pub run_state: RunState,
}

impl ExtractionState {
    /// Create the state for a run starting at `cursor`
    pub fn new(cursor: u64) -> Self {
        Self {
            attempt: 0,
            cursor,
            records_total: Vec::new(),
            metadata_total: Vec::new(),
            pages: 0,
            run_state: RunState::Fetching,
        }
    }
}

/// Everything a run collected
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Records from every non-empty page
    pub records: Vec<JsonValue>,
    /// Metadata from every successful request, including the terminal empty page
    pub metadata: Vec<JsonValue>,
    /// How the run ended
    pub termination: Termination,
    /// Non-empty pages collected
    pub pages: u64,
    /// Cursor the run stopped at
    pub final_cursor: u64,
}

impl ExtractionResult {
    /// Check if the run finished cleanly
    pub fn is_complete(&self) -> bool {
        self.termination.is_done()
    }

    /// Abort reason, if the run stopped early
    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match &self.termination {
            Termination::Aborted(reason) => Some(reason),
            Termination::Done => None,
        }
    }

    /// Split into (records, metadata)
    pub fn into_parts(self) -> (Vec<JsonValue>, Vec<JsonValue>) {
        (self.records, self.metadata)
    }
}
