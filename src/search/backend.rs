//! Search backends and response pages

use crate::client::SearchClient;
use eyre::{Context, Result, eyre};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A backend able to answer one `_search` request body with a response
pub trait SearchBackend: Send + Sync {
    /// Run a search and return the raw JSON response
    ///
    /// # Errors
    /// Returns an error if the request cannot be sent or the response is
    /// not JSON
    fn search(&self, body: &Value) -> impl std::future::Future<Output = Result<Value>> + Send;
}

impl SearchBackend for SearchClient {
    async fn search(&self, body: &Value) -> Result<Value> {
        SearchClient::search(self, body).await
    }
}

/// Backend answering every request with the same stored response
///
/// Useful for replaying an exported `_search` response without a cluster.
#[derive(Debug, Clone)]
pub struct FixtureBackend {
    path: PathBuf,
}

impl FixtureBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SearchBackend for FixtureBackend {
    async fn search(&self, _body: &Value) -> Result<Value> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read fixture: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture: {}", self.path.display()))
    }
}

/// Backend selected at runtime
#[derive(Debug, Clone)]
pub enum Backend {
    Live(SearchClient),
    Fixture(FixtureBackend),
}

impl SearchBackend for Backend {
    async fn search(&self, body: &Value) -> Result<Value> {
        match self {
            Self::Live(client) => SearchBackend::search(client, body).await,
            Self::Fixture(fixture) => fixture.search(body).await,
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live(client) => write!(f, "{}", client),
            Self::Fixture(fixture) => write!(f, "fixture {}", fixture.path.display()),
        }
    }
}

/// Bookkeeping for one page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageStats {
    /// Total matching documents reported by the backend
    pub total: u64,
    /// Hits actually contained in the page
    pub returned: usize,
    /// Page size not filled by the reported total (`limit - total`)
    pub missed: usize,
    /// Matching documents beyond the page size (`total - limit`)
    pub truncated: u64,
}

/// Hits and statistics parsed from one `_search` response
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub hits: Vec<Value>,
    pub stats: PageStats,
}

impl SearchPage {
    /// Parse a `_search` response requested with page size `limit`
    ///
    /// `hits.total` may be an object (`{"value": n}`) or a bare number; when
    /// it is absent the page length is used.
    ///
    /// # Errors
    /// Returns an error if the response has no `hits.hits` array
    pub fn from_response(response: Value, limit: usize) -> Result<Self> {
        let total = response
            .pointer("/hits/total/value")
            .or_else(|| response.pointer("/hits/total"))
            .and_then(Value::as_u64);

        let hits = match response.pointer("/hits/hits") {
            Some(Value::Array(hits)) => hits.clone(),
            _ => return Err(eyre!("Search response has no hits.hits array")),
        };

        let returned = hits.len();
        let total = total.unwrap_or(returned as u64);
        let stats = PageStats {
            total,
            returned,
            missed: usize::try_from((limit as u64).saturating_sub(total)).unwrap_or(0),
            truncated: total.saturating_sub(limit as u64),
        };

        Ok(Self { hits, stats })
    }
}
