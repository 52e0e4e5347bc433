//! Search client module
//!
//! Provides `SearchClient` for sending `_search` requests to a cluster.
//! The client can be scoped to an index pattern via `.index(pattern)`.

use super::Auth;
use eyre::{Context, Result, eyre};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Search client for making API requests.
///
/// The client can operate in two modes:
/// - **Cluster mode** (`index: None`): searches hit `/_search`
/// - **Index mode** (`index: Some(pattern)`): searches hit `/{pattern}/_search`
///
/// # Example
/// ```no_run
/// use log_harvester::client::{Auth, SearchClient};
/// use serde_json::json;
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://localhost:9200")?;
/// let client = SearchClient::try_new(url, Auth::Apikey("key".into()), false)?;
///
/// let metricbeat = client.index("metricbeat-*");
/// let response = metricbeat.search(&json!({"size": 1})).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SearchClient {
    client: Client,
    url: Url,
    index: Option<String>,
}

impl SearchClient {
    /// Create a new cluster-mode client from a URL and credentials.
    ///
    /// # Arguments
    /// * `url` - Base cluster URL
    /// * `auth` - Authentication method
    /// * `accept_invalid_certs` - Skip TLS certificate verification
    ///
    /// # Errors
    /// Returns an error if the headers are invalid or the HTTP client
    /// cannot be built
    pub fn try_new(url: Url, auth: Auth, accept_invalid_certs: bool) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::CONTENT_TYPE, "application/json".parse()?);
        auth.apply(&mut headers)?;

        if accept_invalid_certs {
            log::warn!("TLS certificate verification is disabled for {}", url);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            url,
            index: None,
        })
    }

    /// Create a client scoped to the given index pattern.
    pub fn index(&self, pattern: &str) -> SearchClient {
        SearchClient {
            client: self.client.clone(),
            url: self.url.clone(),
            index: Some(pattern.to_string()),
        }
    }

    /// Get the current index pattern, if scoped.
    pub fn index_pattern(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path of the `_search` endpoint for the current scope.
    pub fn search_path(&self) -> String {
        match &self.index {
            Some(index) => format!("/{}/_search", index.trim_matches('/')),
            None => "/_search".to_string(),
        }
    }

    /// Verify the connection and authentication to the cluster.
    ///
    /// Makes a GET request to the root path.
    pub async fn test_connection(&self) -> Result<reqwest::Response> {
        self.request(Method::GET, "/", None).await
    }

    /// Send a request to a given path.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<reqwest::Response> {
        let url = self
            .url
            .join(path)
            .with_context(|| format!("Invalid request path: {}", path))?;

        let request = self.client.request(method, url);
        let response = match body {
            Some(body) => {
                log::trace!("Sending request with body");
                request.body(body.to_vec()).send().await
            }
            None => request.send().await,
        };
        response.map_err(|e| eyre!("Failed to send request: {}", e))
    }

    /// Helper for POST requests with JSON value.
    pub async fn post_json_value(&self, path: &str, value: &Value) -> Result<reqwest::Response> {
        let body = serde_json::to_vec(value)?;
        self.request(Method::POST, path, Some(&body)).await
    }

    /// Run a `_search` request and return the JSON response.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-success status or a
    /// response body that is not JSON
    pub async fn search(&self, body: &Value) -> Result<Value> {
        let path = self.search_path();
        let response = self
            .post_json_value(&path, body)
            .await
            .with_context(|| format!("Failed to search {}", path))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Search failed ({}): {}", status, body);
        }

        response
            .json::<Value>()
            .await
            .with_context(|| "Failed to parse search response")
    }
}

impl std::fmt::Display for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.index {
            Some(index) => write!(f, "{} (index: {})", self.url, index),
            None => write!(f, "{}", self.url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SearchClient {
        let url = Url::parse("https://localhost:9200").unwrap();
        SearchClient::try_new(url, Auth::None, false).unwrap()
    }

    #[test]
    fn test_cluster_mode() {
        let client = client();
        assert!(client.index_pattern().is_none());
        assert_eq!(client.search_path(), "/_search");
        assert_eq!(client.to_string(), "https://localhost:9200/");
    }

    #[test]
    fn test_index_scoped_client() {
        let client = client().index("metricbeat-*");
        assert_eq!(client.index_pattern(), Some("metricbeat-*"));
        assert_eq!(client.search_path(), "/metricbeat-*/_search");
        assert_eq!(
            client.to_string(),
            "https://localhost:9200/ (index: metricbeat-*)"
        );
    }

    #[test]
    fn test_insecure_client_builds() {
        let url = Url::parse("https://116.101.122.180:5200").unwrap();
        let client =
            SearchClient::try_new(url, Auth::Apikey("secret".to_string()), true).unwrap();
        assert_eq!(client.url().port(), Some(5200));
    }
}
