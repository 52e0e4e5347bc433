//! APM log documents: message and exceptions

use super::{LogSource, query_string_clause, source_of};
use crate::record::Record;
use serde_json::Value;

/// Projects the log message and any captured exceptions
#[derive(Debug, Clone, Default)]
pub struct LogsApm {
    query: Option<String>,
}

impl LogsApm {
    pub fn new(query: Option<String>) -> Self {
        Self { query }
    }
}

impl LogSource for LogsApm {
    fn name(&self) -> &str {
        "logs-apm"
    }

    fn index_pattern(&self) -> &str {
        "logs-apm-*"
    }

    fn query_clause(&self) -> Option<Value> {
        self.query.as_deref().map(query_string_clause)
    }

    fn project(&self, hit: &Value) -> Record {
        let source = source_of(hit);

        let info = source
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let errors = source
            .pointer("/error/exception")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Record::new()
            .with("info", info)
            .with("errors", Value::Array(errors))
    }
}
