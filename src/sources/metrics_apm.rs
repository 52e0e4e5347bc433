//! APM metric documents: host and agent metadata

use super::{LogSource, query_string_clause, source_of};
use crate::record::{Record, field};
use serde_json::Value;

/// Projects host and agent metadata out of `metric-apm-*` documents
#[derive(Debug, Clone, Default)]
pub struct MetricsApm {
    query: Option<String>,
}

impl MetricsApm {
    pub fn new(query: Option<String>) -> Self {
        Self { query }
    }
}

impl LogSource for MetricsApm {
    fn name(&self) -> &str {
        "metrics-apm-logs"
    }

    fn index_pattern(&self) -> &str {
        "metric-apm-*"
    }

    fn query_clause(&self) -> Option<Value> {
        self.query.as_deref().map(query_string_clause)
    }

    fn project(&self, hit: &Value) -> Record {
        let source = source_of(hit);

        // A document carrying a non-empty service block came from a live agent
        let service_status = match source.get("service") {
            Some(Value::Object(service)) if !service.is_empty() => "online",
            _ => "offline",
        };

        Record::new()
            .with("request_data_hostname", field(source, "/host/hostname"))
            .with("request_data_os_type", field(source, "/host/os/type"))
            .with("request_data_platform", field(source, "/host/os/platform"))
            .with("request_data_full", field(source, "/host/os/full"))
            .with("request_data_name", field(source, "/host/name"))
            .with(
                "request_data_architecture",
                field(source, "/host/architecture"),
            )
            .with("service_status", service_status)
            .with("agent_name", field(source, "/agent/name"))
            .with("agent_version", field(source, "/agent/version"))
    }
}
