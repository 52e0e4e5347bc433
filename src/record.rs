//! Flat records projected out of raw search hits

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Value written in place of a path that is missing from a hit
pub const PLACEHOLDER: &str = "N/A";

/// A flat mapping from field name to value
///
/// Keys are kept sorted so serializing the same record twice always
/// yields the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize as a single-line JSON object
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(&self.0).context("Failed to serialize record")
    }

    /// Render one field as a CSV cell
    ///
    /// Missing fields and nulls are empty, strings are written raw and
    /// arrays/objects are stringified as compact JSON.
    pub fn cell(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Look up a JSON pointer (`/host/os/type`) in `value`
///
/// Returns [`PLACEHOLDER`] when any segment along the path is missing.
pub fn field(value: &Value, pointer: &str) -> Value {
    value
        .pointer(pointer)
        .cloned()
        .unwrap_or_else(|| Value::from(PLACEHOLDER))
}

/// Look up a numeric field and apply `convert` to it
///
/// Non-numeric or missing values fall back to [`PLACEHOLDER`].
pub fn scaled_field(value: &Value, pointer: &str, convert: impl Fn(f64) -> f64) -> Value {
    value
        .pointer(pointer)
        .and_then(Value::as_f64)
        .map(|n| Value::from(convert(n)))
        .unwrap_or_else(|| Value::from(PLACEHOLDER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cells() {
        let record = Record::new()
            .with("name", "web-01")
            .with("pct", 0.25)
            .with("online", true)
            .with("missing", Value::Null)
            .with("errors", json!([{"message": "boom"}]));

        assert_eq!(record.cell("name"), "web-01");
        assert_eq!(record.cell("pct"), "0.25");
        assert_eq!(record.cell("online"), "true");
        assert_eq!(record.cell("missing"), "");
        assert_eq!(record.cell("absent"), "");
        assert_eq!(record.cell("errors"), r#"[{"message":"boom"}]"#);

        assert_eq!(record.get("pct"), Some(&json!(0.25)));
        assert_eq!(record.get("missing"), Some(&Value::Null));
        assert_eq!(record.get("absent"), None);
    }

    #[test]
    fn test_json_line_is_sorted_and_single_line() {
        let record = Record::new().with("b", 2).with("a", "x\ny");
        assert_eq!(record.to_json_line().unwrap(), r#"{"a":"x\ny","b":2}"#);
    }

    #[test]
    fn test_field_placeholder() {
        let hit = json!({"host": {"name": "web-01"}});
        assert_eq!(field(&hit, "/host/name"), json!("web-01"));
        assert_eq!(field(&hit, "/host/os/type"), json!(PLACEHOLDER));
    }

    #[test]
    fn test_scaled_field() {
        let hit = json!({"bytes": 2048, "label": "n/a"});
        assert_eq!(scaled_field(&hit, "/bytes", |b| b / 1024.0), json!(2.0));
        assert_eq!(scaled_field(&hit, "/label", |b| b), json!(PLACEHOLDER));
        assert_eq!(scaled_field(&hit, "/absent", |b| b), json!(PLACEHOLDER));
    }
}
