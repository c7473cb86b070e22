//! Extraction controller module
//!
//! Walks a page cursor until the API returns an empty page.
//!
//! # Overview
//!
//! [`ExtractionController`] is an explicit state machine:
//!
//! ```text
//!            success, non-empty (cursor += 1, pause)
//!              ┌──────────┐
//!              ▼          │
//!   start ─► Fetching ────┘──── success, empty ──────────► Done
//!              │  ▲
//!   429 / 5xx  │  │ sleep(backoff_base × attempt)
//!              ▼  │
//!            Backoff
//!              │
//!   attempt > max_attempts, other 4xx, transport ───────► Aborted
//! ```
//!
//! Both terminal states return everything collected so far.

mod params;
mod sinks;
mod sleep;
mod types;

pub use params::RequestParams;
pub use sinks::{
    ExtractionEvent, LogSink, MemorySink, NoopProgressSink, ProgressEvent, ProgressSink,
    TracingLogSink, TracingProgressSink,
};
pub use sleep::{RecordingSleeper, Sleeper, TokioSleeper};
pub use types::{AbortReason, ExtractionResult, ExtractionState, RunState, Termination};

use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::fetch::{HttpFetcher, PageFetcher, PageOutcome, PageRequest};
use crate::types::JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Drives a [`PageFetcher`] across every page of an endpoint
pub struct ExtractionController {
    /// Endpoint URL
    base_url: String,
    /// Pass-through parameters and cursor placement
    params: RequestParams,
    /// Response field holding the records
    content_key: String,
    /// Recoverable failures tolerated per page
    max_attempts: u32,
    /// Pause after each non-empty page
    inter_request_delay: Duration,
    /// Linear backoff step
    backoff_base: Duration,
    fetcher: Box<dyn PageFetcher>,
    sleeper: Arc<dyn Sleeper>,
    log: Arc<dyn LogSink>,
    progress: Arc<dyn ProgressSink>,
    state: ExtractionState,
}

impl ExtractionController {
    /// Create a controller over the given fetcher
    ///
    /// Fails before any I/O if the config is invalid or the parameters lack
    /// the cursor key.
    pub fn new(config: ExtractorConfig, fetcher: impl PageFetcher + 'static) -> Result<Self> {
        config.validate()?;
        let params = RequestParams::new(&config.initial_params, &config.cursor_key)?;
        let state = ExtractionState::new(params.initial_cursor());

        Ok(Self {
            inter_request_delay: config.inter_request_delay(),
            backoff_base: config.backoff_base(),
            base_url: config.base_url,
            params,
            content_key: config.content_key,
            max_attempts: config.max_attempts,
            fetcher: Box::new(fetcher),
            sleeper: Arc::new(TokioSleeper),
            log: Arc::new(TracingLogSink),
            progress: Arc::new(TracingProgressSink),
            state,
        })
    }

    /// Create a controller that fetches over HTTP
    pub fn from_config(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::with_config(config.http.to_fetcher_config())?;
        Self::new(config, fetcher)
    }

    /// Set the log sink
    #[must_use]
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log = sink;
        self
    }

    /// Set the progress sink
    #[must_use]
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Set the sleeper used for pauses and backoff
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Current state machine state
    pub fn run_state(&self) -> &RunState {
        &self.state.run_state
    }

    /// Recoverable failures recorded for the current cursor
    pub fn attempt(&self) -> u32 {
        self.state.attempt
    }

    /// Page number of the next request
    pub fn cursor(&self) -> u64 {
        self.state.cursor
    }

    /// Full run state
    pub fn state(&self) -> &ExtractionState {
        &self.state
    }

    /// Run until the API is exhausted or the run aborts
    pub async fn run(mut self) -> ExtractionResult {
        self.log.emit(&ExtractionEvent::Started {
            url: self.base_url.clone(),
        });

        while !self.state.run_state.is_terminal() {
            self.step().await;
        }

        self.finish()
    }

    /// Advance the state machine by one transition
    ///
    /// Terminal states are left unchanged.
    pub async fn step(&mut self) -> &RunState {
        let next = match std::mem::replace(&mut self.state.run_state, RunState::Fetching) {
            RunState::Fetching => self.fetch_page().await,
            RunState::Backoff { wait, .. } => {
                self.sleeper.sleep(wait).await;
                RunState::Fetching
            }
            terminal => terminal,
        };

        self.state.run_state = next;
        &self.state.run_state
    }

    async fn fetch_page(&mut self) -> RunState {
        let query = self.params.query(self.state.cursor);
        let request = PageRequest::new(&self.base_url, &query, &self.content_key);

        self.log.emit(&ExtractionEvent::RequestIssued {
            url: request.full_url(),
            cursor: self.state.cursor,
        });

        let outcome = self.fetcher.fetch(&request).await;
        match outcome {
            PageOutcome::Success { metadata, records } => self.on_success(metadata, records).await,
            PageOutcome::RecoverableFailure { status } => self.on_recoverable(status),
            PageOutcome::UnrecoverableFailure { status } => {
                self.abort(AbortReason::Unrecoverable { status })
            }
            PageOutcome::TransportFailure { cause } => self.abort(AbortReason::Transport { cause }),
        }
    }

    async fn on_success(&mut self, metadata: JsonValue, records: Vec<JsonValue>) -> RunState {
        self.state.attempt = 0;
        self.state.metadata_total.push(metadata);

        if records.is_empty() {
            self.log.emit(&ExtractionEvent::Exhausted {
                cursor: self.state.cursor,
            });
            return RunState::Done;
        }

        self.state.records_total.extend(records);
        self.state.pages += 1;
        self.state.cursor += 1;

        self.progress.on_page(ProgressEvent {
            pages: self.state.pages,
            records: self.state.records_total.len(),
        });

        self.sleeper.sleep(self.inter_request_delay).await;
        RunState::Fetching
    }

    fn on_recoverable(&mut self, status: u16) -> RunState {
        let attempt = self.state.attempt + 1;
        if attempt > self.max_attempts {
            return self.abort(AbortReason::RetryBudgetExhausted {
                status,
                max_attempts: self.max_attempts,
            });
        }

        self.state.attempt = attempt;
        let wait = self.backoff_base.saturating_mul(attempt);

        self.log.emit(&ExtractionEvent::RetryScheduled {
            status,
            attempt,
            max_attempts: self.max_attempts,
            wait,
        });

        RunState::Backoff { status, wait }
    }

    fn abort(&self, reason: AbortReason) -> RunState {
        self.log.emit(&ExtractionEvent::Aborted {
            reason: reason.clone(),
        });
        RunState::Aborted(reason)
    }

    fn finish(self) -> ExtractionResult {
        let state = self.state;

        self.log.emit(&ExtractionEvent::Summary {
            records: state.records_total.len(),
            metadata_pages: state.metadata_total.len(),
        });

        let termination = match state.run_state {
            RunState::Aborted(reason) => Termination::Aborted(reason),
            _ => Termination::Done,
        };

        ExtractionResult {
            records: state.records_total,
            metadata: state.metadata_total,
            termination,
            pages: state.pages,
            final_cursor: state.cursor,
        }
    }
}

impl std::fmt::Debug for ExtractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionController")
            .field("base_url", &self.base_url)
            .field("params", &self.params)
            .field("max_attempts", &self.max_attempts)
            .field("inter_request_delay", &self.inter_request_delay)
            .field("backoff_base", &self.backoff_base)
            .field("state", &self.state.run_state)
            .finish_non_exhaustive()
    }
}

/// Build an HTTP-backed controller from `config` and run it to completion
pub async fn extract(config: ExtractorConfig) -> Result<ExtractionResult> {
    Ok(ExtractionController::from_config(config)?.run().await)
}
