//! Log sources
//!
//! A [`LogSource`] is the per-index strategy plugged into the generic
//! windowed pipeline. It names the artifacts, contributes an optional fixed
//! query clause and projects each raw hit into a flat [`Record`].
//!
//! Built-in sources:
//! - [`MetricsApm`]: host and agent metadata from APM metric documents
//! - [`LogsApm`]: message and exceptions from APM log documents
//! - [`MetricBeat`]: system metricsets (cpu, memory, load, network)
//! - [`KongAccess`]: raw reverse-proxy access log messages

mod kong;
mod logs_apm;
mod metricbeat;
mod metrics_apm;
mod transformer;

pub use kong::KongAccess;
pub use logs_apm::LogsApm;
pub use metricbeat::MetricBeat;
pub use metrics_apm::MetricsApm;
pub use transformer::SourceTransformer;

use crate::record::Record;
use clap::ValueEnum;
use eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Strategy describing one log source
pub trait LogSource: Send + Sync {
    /// Pipeline name used for the output directory and file names
    fn name(&self) -> &str;

    /// Index pattern queried on the search backend (e.g. `metricbeat-*`)
    fn index_pattern(&self) -> &str;

    /// Extra `must` clause placed next to the time range filter
    fn query_clause(&self) -> Option<Value> {
        None
    }

    /// Project a raw hit into a flat record
    ///
    /// Must never drop a hit: unmatched categories map to an empty record.
    fn project(&self, hit: &Value) -> Record;

    /// Render a record as one line of the text artifact
    fn text_line(&self, record: &Record) -> Result<String> {
        record.to_json_line()
    }
}

/// Known log sources, selectable from the CLI and job files
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    MetricsApm,
    LogsApm,
    Metricbeat,
    Kong,
}

impl SourceKind {
    /// Build the source strategy, optionally filtered by a query string
    pub fn build(self, query: Option<String>) -> Arc<dyn LogSource> {
        match self {
            Self::MetricsApm => Arc::new(MetricsApm::new(query)),
            Self::LogsApm => Arc::new(LogsApm::new(query)),
            Self::Metricbeat => Arc::new(MetricBeat::new(query)),
            Self::Kong => Arc::new(KongAccess::new(query)),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MetricsApm => write!(f, "metrics-apm"),
            Self::LogsApm => write!(f, "logs-apm"),
            Self::Metricbeat => write!(f, "metricbeat"),
            Self::Kong => write!(f, "kong"),
        }
    }
}

/// `query_string` clause matching every term of `query`
pub fn query_string_clause(query: &str) -> Value {
    json!({
        "query_string": {
            "query": query,
            "default_operator": "AND"
        }
    })
}

static NULL: Value = Value::Null;

/// The hit's `_source` container, or `null` when absent
pub(crate) fn source_of(hit: &Value) -> &Value {
    hit.get("_source").unwrap_or(&NULL)
}
