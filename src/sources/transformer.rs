//! Transformer adapter for log sources

use super::LogSource;
use crate::etl::Transformer;
use crate::record::Record;
use eyre::Result;
use serde_json::Value;
use std::sync::Arc;

/// Transforms raw hits into records using a source's projection
pub struct SourceTransformer {
    source: Arc<dyn LogSource>,
}

impl SourceTransformer {
    pub fn new(source: Arc<dyn LogSource>) -> Self {
        Self { source }
    }
}

impl Transformer for SourceTransformer {
    type Input = Value;
    type Output = Record;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        Ok(self.source.project(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceKind;
    use serde_json::json;

    #[test]
    fn test_record_count_matches_hit_count() {
        let transformer = SourceTransformer::new(SourceKind::Metricbeat.build(None));
        let hits = vec![
            json!({"_source": {"metricset": {"name": "cpu"}}}),
            json!({"_source": {"metricset": {"name": "diskio"}}}),
            json!({}),
        ];

        let records = transformer.transform_many(hits).unwrap();
        assert_eq!(records.len(), 3);
        assert!(!records[0].is_empty());
        assert!(records[1].is_empty());
        assert!(records[2].is_empty());
    }
}
