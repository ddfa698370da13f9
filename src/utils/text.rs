// src/utils/text.rs

//! Text canonicalization for keyword matching.

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Reduce text to its lowercase, accent-free form.
///
/// The input is decomposed (NFKD) so that accented letters split into a base
/// character plus combining marks, the marks are dropped, and the rest is
/// lowercased. `"Café"` and `"CAFE"` both become `"cafe"`.
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Normalize a JSON value. Anything that is not a string yields `""`.
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(s) => normalize(s),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accents_and_case_collapse() {
        assert_eq!(normalize("CAFÉ"), normalize("cafe"));
        assert_eq!(normalize("café"), normalize("cafe"));
        assert_eq!(normalize("Señor Técnico"), "senor tecnico");
    }

    #[test]
    fn test_non_latin_text_survives() {
        assert_eq!(normalize("ΩΜΈΓΑ"), "ωμεγα");
    }

    #[test]
    fn test_normalize_value_non_text() {
        assert_eq!(normalize_value(&json!("Ingeniería")), "ingenieria");
        assert_eq!(normalize_value(&json!(42)), "");
        assert_eq!(normalize_value(&Value::Null), "");
        assert_eq!(normalize_value(&json!(["a"])), "");
    }
}
