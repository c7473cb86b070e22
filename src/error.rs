//! Error types for the API extractor
//!
//! Only construction-time and caller-side failures are surfaced as `Error`.
//! Request failures that happen while a run is in progress never escape the
//! controller; they end the run and show up in
//! [`ExtractionResult::termination`](crate::extract::ExtractionResult).

use thiserror::Error;

/// The main error type for the API extractor
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Request parameters must contain the cursor key '{key}'")]
    MissingCursorKey { key: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing cursor key error
    pub fn missing_cursor_key(key: impl Into<String>) -> Self {
        Self::MissingCursorKey { key: key.into() }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Whether this error was raised while building an extractor, before any I/O
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingCursorKey { .. }
                | Error::InvalidConfigValue { .. }
                | Error::InvalidUrl(_)
                | Error::Http(_)
        )
    }
}

/// Result type alias for the API extractor
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_cursor_key("pagina");
        assert_eq!(
            err.to_string(),
            "Request parameters must contain the cursor key 'pagina'"
        );

        let err = Error::invalid_value("max_attempts", "must be a number");
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'max_attempts': must be a number"
        );
    }

    #[test]
    fn test_is_construction_error() {
        assert!(Error::missing_cursor_key("page").is_construction_error());
        assert!(Error::invalid_value("max_attempts", "bad").is_construction_error());
        assert!(Error::from(url::Url::parse("not a url").unwrap_err()).is_construction_error());
        assert!(!Error::output("disk full").is_construction_error());
        assert!(!Error::FileNotFound {
            path: "extractor.yaml".to_string()
        }
        .is_construction_error());
    }
}
