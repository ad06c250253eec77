//! Translation dictionaries.
//!
//! A dictionary maps dot-delimited keys to format templates. Dictionaries are
//! immutable once built; replacing a locale's strings means registering a new
//! dictionary for it.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

/// Source of format templates by key.
///
/// Implemented by [`TranslationDictionary`]; the resolver only needs this much.
pub trait TemplateSource {
    /// Returns the template stored under `key`.
    fn template(&self, key: &str) -> Option<&str>;
}

/// Immutable key → template map for a single locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationDictionary {
    entries: HashMap<String, String>,
}

impl TranslationDictionary {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document into a dictionary.
    ///
    /// Nested objects are flattened into dot-delimited keys, so
    /// `{"dataTable": {"noData": "No data"}}` yields the key `dataTable.noData`.
    /// Numbers and booleans are stored in their JSON text form; arrays and
    /// nulls carry no template and are skipped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(root) = value else {
            return Err(Error::dictionary("translation table must be a JSON object"));
        };

        let mut entries = HashMap::new();
        for (key, value) in &root {
            flatten_into(&mut entries, key, value);
        }
        Ok(Self { entries })
    }

    /// Read and parse a JSON translation file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::dictionary(format!("Failed to read translation file {}: {}", path.display(), e))
        })?;

        Self::from_json_str(&contents).map_err(|e| {
            Error::dictionary(format!("Failed to parse translation file {}: {}", path.display(), e))
        })
    }

    /// Returns the template stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether `key` has a template.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary holds no templates.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, template)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl TemplateSource for TranslationDictionary {
    fn template(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}

impl<K, V> FromIterator<(K, V)> for TranslationDictionary
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

fn flatten_into(entries: &mut HashMap<String, String>, prefix: &str, value: &Value) {
    match value {
        Value::String(s) => {
            entries.insert(prefix.to_string(), s.clone());
        }
        Value::Number(n) => {
            entries.insert(prefix.to_string(), n.to_string());
        }
        Value::Bool(b) => {
            entries.insert(prefix.to_string(), b.to_string());
        }
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(entries, &format!("{prefix}.{key}"), nested);
            }
        }
        Value::Array(_) | Value::Null => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_objects() {
        let dict = TranslationDictionary::from_json_str(
            r#"{
                "close": "Close",
                "dataTable": {
                    "sortBy": "Sort by",
                    "ariaLabel": { "sortNone": "Not sorted." }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(dict.get("close"), Some("Close"));
        assert_eq!(dict.get("dataTable.sortBy"), Some("Sort by"));
        assert_eq!(dict.get("dataTable.ariaLabel.sortNone"), Some("Not sorted."));
        assert_eq!(dict.get("dataTable"), None);
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_scalars_and_skipped_values() {
        let dict = TranslationDictionary::from_json_str(
            r#"{ "max": 10, "enabled": true, "list": ["a"], "nothing": null }"#,
        )
        .unwrap();

        assert_eq!(dict.get("max"), Some("10"));
        assert_eq!(dict.get("enabled"), Some("true"));
        assert!(!dict.contains_key("list"));
        assert!(!dict.contains_key("nothing"));
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        let err = TranslationDictionary::from_json_str(r#"["a", "b"]"#).unwrap_err();
        assert!(matches!(err, Error::Dictionary(_)));

        let err = TranslationDictionary::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_from_pairs() {
        let dict: TranslationDictionary = [("a.b", "one"), ("c", "two")].into_iter().collect();
        assert_eq!(dict.template("a.b"), Some("one"));
        assert_eq!(dict.iter().count(), 2);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("de-DE.json");
        std::fs::write(&path, r#"{ "close": "Schließen" }"#).unwrap();

        let dict = TranslationDictionary::from_json_file(&path).unwrap();
        assert_eq!(dict.get("close"), Some("Schließen"));

        let missing = TranslationDictionary::from_json_file(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(Error::Dictionary(_))));
    }
}
