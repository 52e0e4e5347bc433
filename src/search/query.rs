//! Search request bodies

use serde_json::{Value, json};

/// Builder for the paged `@timestamp` range query
///
/// # Example
/// ```
/// use log_harvester::search::SearchQuery;
///
/// let body = SearchQuery::new(100).build("2025-01-01T00:00:00.000Z", "2025-01-01T00:00:01.000Z");
/// assert_eq!(body["size"], 100);
/// assert_eq!(body["sort"][0]["@timestamp"]["order"], "asc");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    size: usize,
    clauses: Vec<Value>,
}

impl SearchQuery {
    /// Create a query returning at most `size` hits per page
    pub fn new(size: usize) -> Self {
        Self {
            size,
            clauses: Vec::new(),
        }
    }

    /// Add a fixed `must` clause placed before the time range
    pub fn with_clause(mut self, clause: Option<Value>) -> Self {
        self.clauses.extend(clause);
        self
    }

    /// Build the request body for the `[gte, lte]` timestamp range
    pub fn build(&self, gte: &str, lte: &str) -> Value {
        let mut must = self.clauses.clone();
        must.push(json!({
            "range": {
                "@timestamp": {
                    "gte": gte,
                    "lte": lte,
                    "format": "strict_date_optional_time"
                }
            }
        }));

        json!({
            "from": 0,
            "size": self.size,
            "query": {
                "bool": {
                    "must": must
                }
            },
            "sort": [
                {
                    "@timestamp": {
                        "order": "asc"
                    }
                }
            ]
        })
    }
}
