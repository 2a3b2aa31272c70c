//! Key/template translation catalog
//!
//! Templates reference placeholder values as `{{ placeholderValues.N }}`.
//! Catalog files are JSON objects; nested objects are flattened into dotted
//! keys, so `{"quiz": {"started": "..."}}` provides `quiz.started`.

use super::traits::{Translator, TRANSLATION_NOT_FOUND};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

const PLACEHOLDER_PREFIX: &str = "placeholderValues.";

/// In-memory translation catalog for one language
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.entries.insert(key.into(), template.into());
        self
    }

    /// Load a catalog from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translations {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Failed to parse translations {}", path.display()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let mut entries = HashMap::new();
        flatten_into(&mut entries, String::new(), &value);
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str, placeholder_values: &[String]) -> String {
        match self.entries.get(key) {
            Some(template) => substitute(template, placeholder_values),
            None => format!("{}[{}]", TRANSLATION_NOT_FOUND, key),
        }
    }
}

fn flatten_into(entries: &mut HashMap<String, String>, prefix: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(entries, path, child);
            }
        }
        Value::String(s) => {
            entries.insert(prefix, s.clone());
        }
        Value::Null => {}
        other => {
            entries.insert(prefix, other.to_string());
        }
    }
}

/// Replace `{{ placeholderValues.N }}` with the N-th value.
///
/// Unknown expressions and out-of-range indices are left as written.
fn substitute(template: &str, values: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let expression = after[..end].trim();
        let value = expression
            .strip_prefix(PLACEHOLDER_PREFIX)
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| values.get(index));
        match value {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}
