//! Metricbeat system metricsets

use super::{LogSource, query_string_clause, source_of};
use crate::record::{Record, field, scaled_field};
use serde_json::Value;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

const CPU_STATES: [&str; 9] = [
    "total", "user", "system", "iowait", "irq", "softirq", "steal", "nice", "idle",
];

/// Projects `system.*` metrics out of `metricbeat-*` documents
///
/// The projected field set depends on `metricset.name`; documents of any
/// other metricset become empty records so the record count still
/// matches the hit count.
#[derive(Debug, Clone, Default)]
pub struct MetricBeat {
    query: Option<String>,
}

impl MetricBeat {
    pub fn new(query: Option<String>) -> Self {
        Self { query }
    }

    fn cpu(source: &Value) -> Record {
        CPU_STATES
            .iter()
            .map(|state| {
                (
                    format!("cpu_{}", state),
                    field(source, &format!("/system/cpu/{}/pct", state)),
                )
            })
            .collect()
    }

    fn memory(source: &Value) -> Record {
        Self::common(source)
            .with(
                "total_memory",
                scaled_field(source, "/system/memory/total", |b| b / GIB),
            )
            .with(
                "used_memory",
                scaled_field(source, "/system/memory/used/pct", |p| p * 100.0),
            )
            .with(
                "free_memory",
                scaled_field(source, "/system/memory/free", |b| b / GIB),
            )
            .with(
                "cached_memory",
                scaled_field(source, "/system/memory/cached", |b| b / GIB),
            )
    }

    fn load(source: &Value) -> Record {
        Self::common(source)
            .with("cores", field(source, "/system/load/cores"))
            .with("load_1", field(source, "/system/load/1"))
            .with("load_5", field(source, "/system/load/5"))
            .with("load_15", field(source, "/system/load/15"))
    }

    fn network(source: &Value) -> Record {
        Self::common(source)
            .with("interface_name", field(source, "/system/network/name"))
            .with(
                "in_bytes",
                scaled_field(source, "/system/network/in/bytes", |b| b / MIB),
            )
            .with(
                "out_bytes",
                scaled_field(source, "/system/network/out/bytes", |b| b / MIB),
            )
    }

    fn common(source: &Value) -> Record {
        Record::new()
            .with("timestamp", field(source, "/@timestamp"))
            .with("env", field(source, "/env"))
            .with("host_name", field(source, "/host/name"))
    }
}

impl LogSource for MetricBeat {
    fn name(&self) -> &str {
        "metrics-beat"
    }

    fn index_pattern(&self) -> &str {
        "metricbeat-*"
    }

    fn query_clause(&self) -> Option<Value> {
        self.query.as_deref().map(query_string_clause)
    }

    fn project(&self, hit: &Value) -> Record {
        let source = source_of(hit);
        let metricset = source
            .pointer("/metricset/name")
            .and_then(Value::as_str)
            .unwrap_or_default();

        match metricset {
            "cpu" => Self::cpu(source),
            "memory" => Self::memory(source),
            "load" => Self::load(source),
            "network" => Self::network(source),
            other => {
                log::trace!("Skipping fields of unsupported metricset '{}'", other);
                Record::new()
            }
        }
    }
}
