//! Extractor configuration
//!
//! Settings for one extraction run, loadable from YAML or JSON:
//!
//! ```yaml
//! base_url: https://api.obrasgov.gestao.gov.br/obrasgov/api/projeto-investimento
//! initial_params:
//!   pagina: 0
//!   tamanhoDaPagina: 100
//!   uf: DF
//! max_attempts: 20
//! inter_request_delay_seconds: 30
//! backoff_base_seconds: 30
//! ```

use crate::error::{Error, Result};
use crate::fetch::HttpFetcherConfig;
use crate::types::{JsonObject, JsonValue, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default query parameter used as the page cursor
pub const DEFAULT_CURSOR_KEY: &str = "pagina";

/// Default response field holding the page records
pub const DEFAULT_CONTENT_KEY: &str = "content";

/// Default retry budget per page
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Default pause after each successful page, in seconds
pub const DEFAULT_INTER_REQUEST_DELAY_SECONDS: f64 = 30.0;

/// Default linear backoff step, in seconds
pub const DEFAULT_BACKOFF_BASE_SECONDS: f64 = 30.0;

/// Upper bound for the pause and the backoff step (one week)
pub const MAX_WAIT_SECONDS: f64 = 7.0 * 24.0 * 3600.0;

// ============================================================================
// Extractor Config
// ============================================================================

/// Configuration for one extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Endpoint URL, without query string
    pub base_url: String,

    /// Query parameters; must contain the cursor key
    #[serde(default)]
    pub initial_params: JsonObject,

    /// Recoverable failures tolerated per page before aborting
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause after every successful page
    #[serde(default = "default_inter_request_delay")]
    pub inter_request_delay_seconds: f64,

    /// Backoff step; retry n waits `backoff_base_seconds * n`
    #[serde(default = "default_backoff_base")]
    pub backoff_base_seconds: f64,

    /// Query parameter holding the page number
    #[serde(default = "default_cursor_key")]
    pub cursor_key: String,

    /// Response field holding the records
    #[serde(default = "default_content_key")]
    pub content_key: String,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpSettings,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_inter_request_delay() -> f64 {
    DEFAULT_INTER_REQUEST_DELAY_SECONDS
}

fn default_backoff_base() -> f64 {
    DEFAULT_BACKOFF_BASE_SECONDS
}

fn default_cursor_key() -> String {
    DEFAULT_CURSOR_KEY.to_string()
}

fn default_content_key() -> String {
    DEFAULT_CONTENT_KEY.to_string()
}

impl ExtractorConfig {
    /// Create a config with defaults for everything but the URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            initial_params: JsonObject::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            inter_request_delay_seconds: DEFAULT_INTER_REQUEST_DELAY_SECONDS,
            backoff_base_seconds: DEFAULT_BACKOFF_BASE_SECONDS,
            cursor_key: default_cursor_key(),
            content_key: default_content_key(),
            http: HttpSettings::default(),
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.initial_params.insert(key.into(), value.into());
        self
    }

    /// Set the retry budget per page
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the pause after each successful page
    #[must_use]
    pub fn with_inter_request_delay(mut self, delay: Duration) -> Self {
        self.inter_request_delay_seconds = delay.as_secs_f64();
        self
    }

    /// Set the linear backoff step
    #[must_use]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base_seconds = base.as_secs_f64();
        self
    }

    /// Set the cursor query parameter
    #[must_use]
    pub fn with_cursor_key(mut self, key: impl Into<String>) -> Self {
        self.cursor_key = key.into();
        self
    }

    /// Set the response field holding the records
    #[must_use]
    pub fn with_content_key(mut self, key: impl Into<String>) -> Self {
        self.content_key = key.into();
        self
    }

    /// Pause after each successful page
    pub fn inter_request_delay(&self) -> Duration {
        seconds_to_duration(self.inter_request_delay_seconds)
    }

    /// Linear backoff step
    pub fn backoff_base(&self) -> Duration {
        seconds_to_duration(self.backoff_base_seconds)
    }

    /// Validate the configuration
    ///
    /// Runs before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::invalid_value("base_url", "must not be empty"));
        }

        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.cursor_key.is_empty() {
            return Err(Error::invalid_value("cursor_key", "must not be empty"));
        }
        if self.content_key.is_empty() {
            return Err(Error::invalid_value("content_key", "must not be empty"));
        }

        check_seconds("inter_request_delay_seconds", self.inter_request_delay_seconds)?;
        check_seconds("backoff_base_seconds", self.backoff_base_seconds)?;

        if !self.initial_params.contains_key(&self.cursor_key) {
            return Err(Error::missing_cursor_key(&self.cursor_key));
        }

        Ok(())
    }
}

fn check_seconds(field: &str, value: f64) -> Result<()> {
    if !(0.0..=MAX_WAIT_SECONDS).contains(&value) {
        return Err(Error::invalid_value(
            field,
            format!("must be between 0 and {MAX_WAIT_SECONDS} seconds, got {value}"),
        ));
    }

    Duration::try_from_secs_f64(value)
        .map(|_| ())
        .map_err(|e| Error::invalid_value(field, e.to_string()))
}

/// Unvalidated values saturate instead of panicking
fn seconds_to_duration(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

impl HttpSettings {
    /// Convert to an HTTP fetcher config
    pub fn to_fetcher_config(&self) -> HttpFetcherConfig {
        let mut builder =
            HttpFetcherConfig::builder().timeout(Duration::from_secs(self.timeout_seconds));

        if let Some(agent) = self.user_agent.clone().none_if_empty() {
            builder = builder.user_agent(agent);
        }

        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }

        builder.build()
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load an extractor config from a YAML or JSON file
///
/// `.json` files are parsed as JSON, everything else as YAML.
pub fn load_config(path: impl AsRef<Path>) -> Result<ExtractorConfig> {
    let config = read_config(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse a config file without validating it
///
/// Used when command-line overrides still have to be applied.
pub fn read_config(path: impl AsRef<Path>) -> Result<ExtractorConfig> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        }
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Parse and validate an extractor config from YAML
pub fn load_config_from_yaml(yaml: &str) -> Result<ExtractorConfig> {
    let config: ExtractorConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate an extractor config from JSON
pub fn load_config_from_json(json: &str) -> Result<ExtractorConfig> {
    let config: ExtractorConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}
