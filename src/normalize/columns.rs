//! Column name normalization
//!
//! Turns API field names such as `"Data de Início"` or `"valorTotalObra"`
//! into snake_case ASCII identifiers (`data_de_inicio`, `valor_total_obra`).

use crate::types::JsonObject;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static NON_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_]").unwrap());

/// A capitalized word following any character: `totalValue` -> `total_Value`
static CAPITALIZED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());

/// Lower/digit to upper boundary: `valueID` -> `value_ID`
static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

static UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Normalize a column name to snake_case ASCII
///
/// Accents are removed through compatibility decomposition, so `º` and
/// `ª` become `o` and `a`. Any character outside `[0-9A-Za-z_]` becomes
/// an underscore, camelCase is split, runs of underscores are collapsed and
/// leading/trailing underscores trimmed.
pub fn normalize_column_name(name: &str) -> String {
    let stripped: String = name.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    let s = WHITESPACE.replace_all(&stripped, "_");
    let s = NON_IDENTIFIER.replace_all(&s, "_");
    let s = CAPITALIZED_WORD.replace_all(&s, "${1}_${2}");
    let s = CASE_BOUNDARY.replace_all(&s, "${1}_${2}");
    let s = s.to_lowercase();
    let s = UNDERSCORES.replace_all(&s, "_");

    s.trim_matches('_').to_string()
}

/// Build the rename mapping for a set of column names
///
/// Names are processed in the given order. When two names normalize to the
/// same value, later ones get `_2`, `_3`, ... appended.
pub fn column_mapping<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<(String, String)> {
    let mut seen_sources = HashSet::new();
    let mut taken = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut mapping = Vec::new();

    for name in names {
        if !seen_sources.insert(name.to_string()) {
            continue;
        }

        let base = normalize_column_name(name);
        let mut candidate = base.clone();
        while taken.contains(&candidate) {
            let counter = counters.entry(base.clone()).or_insert(1);
            *counter += 1;
            candidate = format!("{base}_{counter}");
        }

        taken.insert(candidate.clone());
        mapping.push((name.to_string(), candidate));
    }

    mapping
}

/// Rename every key of every row to its normalized name
///
/// The mapping is computed over the union of keys in first-seen order, so
/// the same source name always maps to the same column across rows.
pub fn normalize_columns(rows: Vec<JsonObject>) -> Vec<JsonObject> {
    let mapping: HashMap<String, String> =
        column_mapping(rows.iter().flat_map(|row| row.keys().map(String::as_str)))
            .into_iter()
            .collect();

    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(key, value)| {
                    let renamed = mapping.get(&key).cloned().unwrap_or(key);
                    (renamed, value)
                })
                .collect()
        })
        .collect()
}
