//! CLI helper functions

use crate::{
    access_log::{AccessLogParser, AccessLogReport, write_csv},
    client::{Auth, SearchClient},
    harvester::{RunSummary, WindowedPipeline},
    job::JobFile,
    search::{Backend, FixtureBackend},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use url::Url;

/// Load search client from environment variables
///
/// Expected environment variables:
/// - SEARCH_URL: Cluster base URL (required)
/// - SEARCH_APIKEY: API key for auth (optional, wins over username/password)
/// - SEARCH_USERNAME: Username for basic auth (optional)
/// - SEARCH_PASSWORD: Password for basic auth (optional)
/// - SEARCH_INSECURE: `true` to skip TLS certificate verification (optional)
pub fn load_search_client() -> Result<SearchClient> {
    let url_str = std::env::var("SEARCH_URL").context("SEARCH_URL environment variable not set")?;
    let url = Url::parse(&url_str).with_context(|| format!("Invalid SEARCH_URL: {}", url_str))?;

    let auth = Auth::new(
        std::env::var("SEARCH_USERNAME").ok(),
        std::env::var("SEARCH_PASSWORD").ok(),
        std::env::var("SEARCH_APIKEY").ok(),
    );
    log::debug!("Using {} authentication", auth);

    let insecure = std::env::var("SEARCH_INSECURE")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false);

    SearchClient::try_new(url, auth, insecure).context("Failed to create search client")
}

/// Pick the backend a job runs against
///
/// A fixture file wins; otherwise a live client scoped to `index_pattern`.
pub fn load_backend(fixture: Option<&Path>, index_pattern: &str) -> Result<Backend> {
    match fixture {
        Some(path) => {
            if !path.exists() {
                eyre::bail!("Fixture file not found: {}", path.display());
            }
            Ok(Backend::Fixture(FixtureBackend::new(path)))
        }
        None => Ok(Backend::Live(load_search_client()?.index(index_pattern))),
    }
}

/// Harvest every range of a job
///
/// Pipeline per window: SearchExtractor → SourceTransformer → WindowWriter
pub async fn run_job(job: &JobFile) -> Result<RunSummary> {
    let windows = job.windows()?;
    if windows.is_empty() {
        log::warn!("Job for {} lists no ranges", job.source.cyan());
        return Ok(RunSummary::default());
    }

    let source = job.source.build(job.query.clone());
    let backend = load_backend(job.fixture.as_deref(), source.index_pattern())?;
    log::info!(
        "Harvesting {} from {}",
        source.name().cyan(),
        backend.bright_black()
    );

    let pipeline = WindowedPipeline::new(backend, source, &job.save_dir)
        .with_paging(job.paging())
        .with_cut_off_secs(job.cut_off);

    let mut summary = RunSummary::default();
    for (i, range) in windows.iter().enumerate() {
        log::info!("Range {}/{}: {}", i + 1, windows.len(), range);
        summary += pipeline.run(range).await?;
    }

    log::info!(
        "✓ Harvested {} record(s) in {} window(s) to {}",
        summary.records,
        summary.windows,
        job.save_dir.display().bright_black()
    );
    Ok(summary)
}

/// Read a job file and run it
pub async fn run_job_file(path: impl AsRef<Path>) -> Result<RunSummary> {
    let path = path.as_ref();
    log::info!("Loading job from {}", path.display().bright_black());
    let job = JobFile::read(path)?;
    run_job(&job).await
}

/// Verify connectivity and credentials against the cluster root
pub async fn test_connection() -> Result<()> {
    let client = load_search_client()?;
    log::info!("Connecting to {}", client.url().bright_black());

    let response = client.test_connection().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        eyre::bail!("Authorization failed ({}): {}", status, body);
    }

    log::info!("✓ Connected to {} ({})", client.url(), status.green());
    Ok(())
}

/// Default CSV path for a parsed log: `access.log` → `access.parsed.csv`
pub fn default_csv_path(log: &Path) -> PathBuf {
    log.with_extension("parsed.csv")
}

fn access_log_parser(pattern: Option<&str>) -> Result<AccessLogParser> {
    match pattern {
        Some(pattern) => AccessLogParser::new(pattern),
        None => AccessLogParser::with_default_pattern(),
    }
}

/// Parse an access log and export it as CSV
///
/// Returns the number of entries written.
pub fn parse_access_log(
    log: impl AsRef<Path>,
    pattern: Option<&str>,
    output: Option<&Path>,
) -> Result<usize> {
    let log = log.as_ref();
    let parser = access_log_parser(pattern)?;
    let entries = parser.parse_file(log)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_csv_path(log));
    let count = write_csv(&entries, &output)?;

    log::info!("✓ Wrote {} entries to {}", count, output.display().bright_black());
    Ok(count)
}

/// Parse an access log and summarise it
pub fn report_access_log(
    log: impl AsRef<Path>,
    pattern: Option<&str>,
    top: usize,
) -> Result<AccessLogReport> {
    let parser = access_log_parser(pattern)?;
    let entries = parser.parse_file(log)?;
    Ok(AccessLogReport::build(&entries, top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn clear_env() {
        unsafe {
            std::env::remove_var("SEARCH_URL");
            std::env::remove_var("SEARCH_USERNAME");
            std::env::remove_var("SEARCH_PASSWORD");
            std::env::remove_var("SEARCH_APIKEY");
            std::env::remove_var("SEARCH_INSECURE");
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_load_search_client_no_url() {
        clear_env();

        let result = load_search_client();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SEARCH_URL"));
    }

    #[test]
    #[serial_test::serial]
    fn test_load_search_client_with_url() {
        clear_env();
        unsafe {
            std::env::set_var("SEARCH_URL", "https://localhost:9200");
            std::env::set_var("SEARCH_APIKEY", "abc123");
            std::env::set_var("SEARCH_INSECURE", "true");
        }

        let client = load_search_client().unwrap();
        assert_eq!(client.url().as_str(), "https://localhost:9200/");

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_load_search_client_invalid_url() {
        clear_env();
        unsafe {
            std::env::set_var("SEARCH_URL", "not-a-valid-url");
        }

        let result = load_search_client();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid SEARCH_URL")
        );

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_load_backend_scopes_live_client() {
        clear_env();
        unsafe {
            std::env::set_var("SEARCH_URL", "https://localhost:9200");
        }

        match load_backend(None, "kong-access-*").unwrap() {
            Backend::Live(client) => assert_eq!(client.index_pattern(), Some("kong-access-*")),
            Backend::Fixture(_) => panic!("expected a live backend"),
        }

        clear_env();
    }

    #[test]
    fn test_load_backend_fixture() {
        let temp = TempDir::new().unwrap();
        let fixture = temp.path().join("response.json");
        std::fs::write(&fixture, r#"{"hits": {"hits": []}}"#).unwrap();

        let backend = load_backend(Some(&fixture), "metricbeat-*").unwrap();
        assert!(matches!(backend, Backend::Fixture(_)));

        assert!(load_backend(Some(&temp.path().join("missing.json")), "metricbeat-*").is_err());
    }

    #[test]
    fn test_default_csv_path() {
        assert_eq!(
            default_csv_path(Path::new("logs/access.log")),
            PathBuf::from("logs/access.parsed.csv")
        );
    }
}
