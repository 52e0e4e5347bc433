//! Reverse-proxy access logs

use super::{LogSource, query_string_clause, source_of};
use crate::record::Record;
use eyre::Result;
use serde_json::Value;

/// Keeps the raw access log line of `kong-access-*` documents
///
/// The text artifact carries the raw message rather than JSON, so it can
/// be fed straight into [`crate::access_log::AccessLogParser`].
#[derive(Debug, Clone, Default)]
pub struct KongAccess {
    query: Option<String>,
}

impl KongAccess {
    pub fn new(query: Option<String>) -> Self {
        Self { query }
    }
}

impl LogSource for KongAccess {
    fn name(&self) -> &str {
        "kong-logs"
    }

    fn index_pattern(&self) -> &str {
        "kong-access-*"
    }

    fn query_clause(&self) -> Option<Value> {
        self.query.as_deref().map(query_string_clause)
    }

    fn project(&self, hit: &Value) -> Record {
        let message = source_of(hit)
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Record::new().with("message", message)
    }

    fn text_line(&self, record: &Record) -> Result<String> {
        Ok(record.cell("message"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LINE: &str = r#"kong stdout F 10.0.0.7 - - [22/Dec/2024:00:00:01 +0700] "GET /health HTTP/1.1" 200 12 "-" "kube-probe/1.29""#;

    #[test]
    fn test_text_line_is_raw_message() {
        let source = KongAccess::default();
        let record = source.project(&json!({"_source": {"message": LINE}}));

        assert_eq!(record.cell("message"), LINE);
        assert_eq!(source.text_line(&record).unwrap(), LINE);
    }

    #[test]
    fn test_missing_message() {
        let source = KongAccess::default();
        let record = source.project(&json!({"_id": "1"}));
        assert_eq!(record.len(), 1);
        assert_eq!(source.text_line(&record).unwrap(), "");
    }
}
