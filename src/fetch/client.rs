//! HTTP page fetcher
//!
//! `reqwest`-backed [`PageFetcher`]. It performs exactly one GET per call and
//! leaves every retry decision to the extraction controller.

use super::types::{PageFetcher, PageOutcome, PageRequest};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("api-extractor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpFetcherConfig {
    /// Create a new config builder
    pub fn builder() -> HttpFetcherConfigBuilder {
        HttpFetcherConfigBuilder::default()
    }
}

/// Builder for HTTP fetcher config
#[derive(Default)]
pub struct HttpFetcherConfigBuilder {
    config: HttpFetcherConfig,
}

impl HttpFetcherConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpFetcherConfig {
        self.config
    }
}

/// Page fetcher over `reqwest`
pub struct HttpFetcher {
    client: Client,
    config: HttpFetcherConfig,
}

impl HttpFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpFetcherConfig::default())
    }

    /// Create a fetcher with custom configuration
    ///
    /// Header names and values are checked here, so a bad header fails
    /// construction instead of every request.
    pub fn with_config(config: HttpFetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(header_map(&config.default_headers)?)
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: &PageRequest<'_>) -> PageOutcome {
        let mut req = self.client.get(request.url);

        if !request.query.is_empty() {
            req = req.query(request.query);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Transport failure for {}: {e}", request.url);
                return PageOutcome::transport(e.to_string());
            }
        };

        let status = response.status().as_u16();
        if let Some(failure) = PageOutcome::from_status(status) {
            debug!("Request to {} failed with HTTP {status}", response.url());
            return failure;
        }

        debug!("Request succeeded: GET {}", response.url());
        match response.json::<Value>().await {
            Ok(body) => PageOutcome::from_body(body, request.content_key),
            Err(e) => PageOutcome::transport(format!("Failed to decode response body: {e}")),
        }
    }
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::invalid_value("http.headers", format!("'{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::invalid_value("http.headers", format!("'{name}' value: {e}")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
