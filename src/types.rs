//! Common types used throughout the API extractor
//!
//! Type aliases and small helpers shared by the fetch, extract and
//! normalize modules.

use serde_json::Value;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type (keys keep insertion order)
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Rendered query string pairs, in request order
pub type QueryPairs = Vec<(String, String)>;

// ============================================================================
// Utilities
// ============================================================================

/// Render a JSON scalar as a query string value
///
/// Returns `None` for nulls, arrays and objects; those need caller-specific
/// handling.
pub fn scalar_to_query_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_to_query_value() {
        assert_eq!(scalar_to_query_value(&json!("abc")), Some("abc".to_string()));
        assert_eq!(scalar_to_query_value(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_to_query_value(&json!(1.5)), Some("1.5".to_string()));
        assert_eq!(scalar_to_query_value(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_to_query_value(&Value::Null), None);
        assert_eq!(scalar_to_query_value(&json!([1, 2])), None);
        assert_eq!(scalar_to_query_value(&json!({"a": 1})), None);
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
    }
}
