//! Page fetcher module
//!
//! One GET per call, classified into a [`PageOutcome`].
//!
//! # Status classification
//!
//! - **2xx**: success, the body is split into metadata and records
//! - **429 or >= 500**: recoverable, the controller backs off and retries
//! - **anything else**: unrecoverable, the run is aborted
//! - **network errors**: transport failure, the run is aborted

mod client;
mod types;

pub use client::{HttpFetcher, HttpFetcherConfig, HttpFetcherConfigBuilder};
pub use types::{
    classify_status, is_recoverable_status, split_page, PageFetcher, PageOutcome, PageRequest,
    StatusClass,
};
