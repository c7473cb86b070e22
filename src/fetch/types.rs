//! Page fetcher types and traits
//!
//! Defines the outcome of a single page request and the fixed status
//! classification rule shared by every fetcher.

use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use serde_json::Value;

/// How an HTTP status code is treated by the extraction loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx, the body is parsed as a page
    Success,
    /// 429 or any 5xx, the same page is retried after a backoff
    Recoverable,
    /// Any other status, the run is aborted
    Unrecoverable,
}

/// Classify an HTTP status code
///
/// 429 and everything from 500 up is recoverable; anything else outside the
/// 2xx range (400, 401, 403, 404, ...) is not.
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        429 => StatusClass::Recoverable,
        s if s >= 500 => StatusClass::Recoverable,
        _ => StatusClass::Unrecoverable,
    }
}

/// Check if an HTTP status is eligible for backoff-and-retry
pub fn is_recoverable_status(status: u16) -> bool {
    classify_status(status) == StatusClass::Recoverable
}

/// Outcome of a single page request
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// The page was fetched and parsed
    Success {
        /// Page response with the content field removed
        metadata: JsonValue,
        /// Records found under the content field, possibly empty
        records: Vec<JsonValue>,
    },
    /// 429 or 5xx
    RecoverableFailure {
        /// HTTP status code
        status: u16,
    },
    /// Any other non-2xx status
    UnrecoverableFailure {
        /// HTTP status code
        status: u16,
    },
    /// Connection, timeout or body decoding failure
    TransportFailure {
        /// Human readable cause
        cause: String,
    },
}

impl PageOutcome {
    /// Build a success outcome by splitting a page body on its content field
    pub fn from_body(body: JsonValue, content_key: &str) -> Self {
        let (metadata, records) = split_page(body, content_key);
        Self::Success { metadata, records }
    }

    /// Build the failure outcome for a non-2xx status
    ///
    /// Returns `None` for 2xx statuses, which are not failures.
    pub fn from_status(status: u16) -> Option<Self> {
        match classify_status(status) {
            StatusClass::Success => None,
            StatusClass::Recoverable => Some(Self::RecoverableFailure { status }),
            StatusClass::Unrecoverable => Some(Self::UnrecoverableFailure { status }),
        }
    }

    /// Create a transport failure
    pub fn transport(cause: impl Into<String>) -> Self {
        Self::TransportFailure {
            cause: cause.into(),
        }
    }

    /// Check if this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Check if this is a success that carries no records
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Success { records, .. } if records.is_empty())
    }
}

/// Split a page body into (metadata, records)
///
/// For an object body the content field is removed and becomes the record
/// list: an array yields its elements, a missing field or a blank value
/// (null, `{}`, `""`, `0`, `false`) yields no records and any other value is
/// a single record. A top-level array body is
/// taken as the record list with empty metadata. Other bodies carry no
/// records and are kept whole as metadata.
pub fn split_page(body: JsonValue, content_key: &str) -> (JsonValue, Vec<JsonValue>) {
    match body {
        Value::Object(mut map) => {
            let records = match map.remove(content_key) {
                Some(Value::Array(items)) => items,
                Some(value) if is_blank(&value) => Vec::new(),
                Some(other) => vec![other],
                None => Vec::new(),
            };
            (Value::Object(map), records)
        }
        Value::Array(items) => (Value::Object(JsonObject::new()), items),
        other => (other, Vec::new()),
    }
}

/// Null, `{}`, `""`, `0` and `false` carry no records
fn is_blank(value: &JsonValue) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
    }
}

/// A single page request handed to a [`PageFetcher`]
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    /// Endpoint URL, without query string
    pub url: &'a str,
    /// Query parameters including the cursor
    pub query: &'a [(String, String)],
    /// Field of the response that holds the records
    pub content_key: &'a str,
}

impl<'a> PageRequest<'a> {
    /// Create a new page request
    pub fn new(url: &'a str, query: &'a [(String, String)], content_key: &'a str) -> Self {
        Self {
            url,
            query,
            content_key,
        }
    }

    /// Full URL with the query string, as it would be sent
    pub fn full_url(&self) -> String {
        match url::Url::parse_with_params(self.url, self.query) {
            Ok(url) => url.to_string(),
            Err(_) => self.url.to_string(),
        }
    }
}

/// Performs one page request
///
/// Implementations never return errors; every failure is folded into a
/// [`PageOutcome`] using [`classify_status`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a single page
    async fn fetch(&self, request: &PageRequest<'_>) -> PageOutcome;
}
