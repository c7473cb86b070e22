//! Request parameters with the page cursor lifted out
//!
//! The cursor lives on [`ExtractionState`](super::ExtractionState); this
//! type only keeps the pass-through parameters and where the cursor goes.

use crate::error::{Error, Result};
use crate::types::{scalar_to_query_value, JsonObject, QueryPairs};
use serde_json::Value;

/// Query parameters for every page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    /// Pass-through parameters, in configured order, without the cursor
    entries: QueryPairs,
    /// Name of the cursor parameter
    cursor_key: String,
    /// Index in `entries` the cursor is rendered at
    cursor_position: usize,
    /// Cursor value found at construction
    initial_cursor: u64,
}

impl RequestParams {
    /// Build request parameters from a configured mapping
    ///
    /// Fails if `cursor_key` is absent or its value is not a non-negative
    /// integer (a numeric string is accepted). Nulls are dropped and arrays
    /// become repeated parameters.
    pub fn new(params: &JsonObject, cursor_key: &str) -> Result<Self> {
        let mut entries = Vec::with_capacity(params.len());
        let mut cursor = None;

        for (key, value) in params {
            if key == cursor_key {
                cursor = Some((entries.len(), parse_cursor(cursor_key, value)?));
                continue;
            }
            push_param(&mut entries, key, value)?;
        }

        let (cursor_position, initial_cursor) =
            cursor.ok_or_else(|| Error::missing_cursor_key(cursor_key))?;

        Ok(Self {
            entries,
            cursor_key: cursor_key.to_string(),
            cursor_position,
            initial_cursor,
        })
    }

    /// Cursor value the run starts from
    pub fn initial_cursor(&self) -> u64 {
        self.initial_cursor
    }

    /// Name of the cursor parameter
    pub fn cursor_key(&self) -> &str {
        &self.cursor_key
    }

    /// Pass-through parameters without the cursor
    pub fn pass_through(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Render the full query for a given cursor value
    pub fn query(&self, cursor: u64) -> QueryPairs {
        let mut query = Vec::with_capacity(self.entries.len() + 1);
        query.extend_from_slice(&self.entries[..self.cursor_position]);
        query.push((self.cursor_key.clone(), cursor.to_string()));
        query.extend_from_slice(&self.entries[self.cursor_position..]);
        query
    }
}

fn parse_cursor(key: &str, value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        Error::invalid_value(key, format!("cursor must be a non-negative integer, got {value}"))
    })
}

fn push_param(entries: &mut QueryPairs, key: &str, value: &Value) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                let rendered = scalar_to_query_value(item).ok_or_else(|| {
                    Error::invalid_value(key, "array parameters may only hold scalars")
                })?;
                entries.push((key.to_string(), rendered));
            }
        }
        Value::Object(_) => {
            return Err(Error::invalid_value(key, "object values are not valid query parameters"));
        }
        scalar => {
            if let Some(rendered) = scalar_to_query_value(scalar) {
                entries.push((key.to_string(), rendered));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn pairs(items: &[(&str, &str)]) -> QueryPairs {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_cursor_lifted_out() {
        let params = object(json!({"uf": "DF", "pagina": 3, "tamanho": 10}));
        let params = RequestParams::new(&params, "pagina").unwrap();

        assert_eq!(params.initial_cursor(), 3);
        assert_eq!(params.cursor_key(), "pagina");
        assert_eq!(params.pass_through(), pairs(&[("uf", "DF"), ("tamanho", "10")]));
    }

    #[test]
    fn test_query_keeps_cursor_position() {
        let params = object(json!({"uf": "DF", "pagina": 0, "tamanho": 10}));
        let params = RequestParams::new(&params, "pagina").unwrap();

        assert_eq!(
            params.query(7),
            pairs(&[("uf", "DF"), ("pagina", "7"), ("tamanho", "10")])
        );
    }

    #[test]
    fn test_missing_cursor_key() {
        let params = object(json!({"uf": "DF"}));
        let err = RequestParams::new(&params, "pagina").unwrap_err();
        assert!(matches!(err, Error::MissingCursorKey { .. }));
    }

    #[test]
    fn test_string_cursor_accepted() {
        let params = object(json!({"page": "12"}));
        let params = RequestParams::new(&params, "page").unwrap();
        assert_eq!(params.initial_cursor(), 12);
    }

    #[test]
    fn test_invalid_cursor_rejected() {
        for bad in [json!(-1), json!(1.5), json!("abc"), json!(null), json!([1])] {
            let params = object(json!({"page": bad}));
            let err = RequestParams::new(&params, "page").unwrap_err();
            assert!(matches!(err, Error::InvalidConfigValue { .. }));
        }
    }

    #[test]
    fn test_array_and_null_params() {
        let params = object(json!({"page": 0, "status": ["A", "B"], "skip": null}));
        let params = RequestParams::new(&params, "page").unwrap();
        assert_eq!(
            params.query(0),
            pairs(&[("page", "0"), ("status", "A"), ("status", "B")])
        );
    }

    #[test]
    fn test_object_param_rejected() {
        let params = object(json!({"page": 0, "filter": {"a": 1}}));
        assert!(RequestParams::new(&params, "page").is_err());
    }
}
