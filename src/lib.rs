// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # API Extractor
//!
//! Resilient extraction of paginated REST APIs.
//!
//! ## Features
//!
//! - **Cursor Pagination**: Increments a numeric page parameter until an empty page
//! - **Linear Backoff**: 429 and 5xx responses are retried after `base × attempt`
//! - **Partial Results**: Aborted runs still return everything collected
//! - **Normalization**: Flatten nested records and snake_case column names
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use api_extractor::{extract, ExtractorConfig, Result};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ExtractorConfig::new("https://api.example.com/obras")
//!         .with_param("pagina", 0)
//!         .with_param("tamanhoDaPagina", 100)
//!         .with_inter_request_delay(Duration::from_secs(1));
//!
//!     let result = extract(config).await?;
//!     println!("{} records, {:?}", result.records.len(), result.termination);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 ExtractionController                     │
//! │  Fetching ──► Backoff ──► Fetching ──► Done / Aborted    │
//! └──────────────────────────────────────────────────────────┘
//!        │                 │                    │
//!        ▼                 ▼                    ▼
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────────┐
//! │ PageFetcher │   │   Sleeper   │   │ LogSink          │
//! │ (reqwest)   │   │ (tokio)     │   │ ProgressSink     │
//! └─────────────┘   └─────────────┘   └──────────────────┘
//!
//! ExtractionResult ──► normalize (flatten, explode, snake_case) ──► output
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, ExtractorConfig, HttpSettings};
pub use error::{Error, Result};
pub use extract::{
    extract, AbortReason, ExtractionController, ExtractionEvent, ExtractionResult, LogSink,
    ProgressEvent, ProgressSink, RunState, Sleeper, Termination,
};
pub use fetch::{HttpFetcher, PageFetcher, PageOutcome, PageRequest};
pub use normalize::{
    explode_field, flatten_record, normalize_column_name, normalize_columns, to_table,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
