//! Harvest job files
//!
//! A job describes one source and the time ranges to harvest from it, so a
//! list of ranges can run unattended in sequence.
//!
//! Example format:
//! ```yaml
//! source: metricbeat
//! query: host.name:web-01
//! step: 1000
//! limit: 5000
//! cut_off: 4000
//! save_dir: ./logs
//! sliding: false
//! ranges:
//!   - [2025-01-02T00:00:00.000Z, 2025-01-03T00:00:00.000Z]
//!   - [2025-01-05T00:00:00.000Z, 2025-01-06T00:00:00.000Z]
//! ```

use crate::harvester::{DEFAULT_CUT_OFF_SECS, DEFAULT_SAVE_DIR};
use crate::search::{DEFAULT_LIMIT, DEFAULT_STEP_MS, PagingMode, PagingOptions};
use crate::sources::SourceKind;
use crate::window::TimeWindow;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One harvest job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobFile {
    pub source: SourceKind,
    /// Optional `query_string` filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Paging increment in milliseconds
    #[serde(default = "default_step")]
    pub step: u64,
    /// Page size
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Window length in seconds
    #[serde(default = "default_cut_off")]
    pub cut_off: u64,
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    /// Move the lower bound of every page up to the previous cursor
    #[serde(default)]
    pub sliding: bool,
    /// Replay a stored response instead of querying a cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<PathBuf>,
    /// `[start, end]` pairs, harvested in order
    #[serde(default)]
    pub ranges: Vec<[String; 2]>,
}

fn default_step() -> u64 {
    DEFAULT_STEP_MS
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_cut_off() -> u64 {
    DEFAULT_CUT_OFF_SECS
}

fn default_save_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SAVE_DIR)
}

impl JobFile {
    /// Job for `source` with default settings and no ranges
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            query: None,
            step: DEFAULT_STEP_MS,
            limit: DEFAULT_LIMIT,
            cut_off: DEFAULT_CUT_OFF_SECS,
            save_dir: default_save_dir(),
            sliding: false,
            fixture: None,
            ranges: Vec::new(),
        }
    }

    /// Append a `[start, end]` range
    pub fn add_range(&mut self, start: impl Into<String>, end: impl Into<String>) {
        self.ranges.push([start.into(), end.into()]);
    }

    /// Paging options described by this job
    pub fn paging(&self) -> PagingOptions {
        PagingOptions {
            step_ms: self.step,
            limit: self.limit,
            mode: match self.sliding {
                true => PagingMode::Sliding,
                false => PagingMode::Growing,
            },
        }
    }

    /// Parse every range
    ///
    /// # Errors
    /// Returns an error naming the first range with an unparsable timestamp
    pub fn windows(&self) -> Result<Vec<TimeWindow>> {
        self.ranges
            .iter()
            .enumerate()
            .map(|(i, [start, end])| {
                TimeWindow::parse(start, end)
                    .with_context(|| format!("Invalid range #{}: {} to {}", i + 1, start, end))
            })
            .collect()
    }

    /// Read a job from a YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read job file: {}", path.as_ref().display()))?;

        let job: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse job file: {}", path.as_ref().display()))?;

        Ok(job)
    }

    /// Write the job to a YAML file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml =
            serde_yaml::to_string(self).with_context(|| "Failed to serialize job to YAML")?;

        std::fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write job file: {}", path.as_ref().display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let yaml = r#"
source: kong
ranges:
  - [2025-01-02T00:00:00.000Z, 2025-01-02T01:00:00.000Z]
"#;
        let job: JobFile = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(job.source, SourceKind::Kong);
        assert_eq!(job.query, None);
        assert_eq!(job.step, 1000);
        assert_eq!(job.limit, 5000);
        assert_eq!(job.cut_off, 4000);
        assert_eq!(job.save_dir, PathBuf::from("./logs"));
        assert_eq!(job.paging().mode, PagingMode::Growing);

        let windows = job.windows().unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].duration_ms(), 3_600_000);
    }

    #[test]
    fn test_full_job() {
        let yaml = r#"
source: metrics-apm
query: cee25daa
step: 500
limit: 100
cut_off: 60
save_dir: /tmp/apm
sliding: true
fixture: response.json
ranges:
  - ["2025-01-02T00:00:00.000Z", "2025-01-02T00:01:00.000Z"]
  - ["2025-01-05T00:00:00.000Z", "2025-01-05T00:01:00.000Z"]
"#;
        let job: JobFile = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(job.source, SourceKind::MetricsApm);
        assert_eq!(job.query.as_deref(), Some("cee25daa"));
        assert_eq!(
            job.paging(),
            PagingOptions {
                step_ms: 500,
                limit: 100,
                mode: PagingMode::Sliding
            }
        );
        assert_eq!(job.fixture, Some(PathBuf::from("response.json")));
        assert_eq!(job.windows().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_range() {
        let mut job = JobFile::new(SourceKind::Metricbeat);
        job.add_range("2025-01-02T00:00:00.000Z", "2025-01-03T00:00:00.000Z");
        job.add_range("yesterday", "today");

        let err = job.windows().unwrap_err();
        assert!(err.to_string().contains("Invalid range #2"));
    }

    #[test]
    fn test_unknown_source() {
        let result: Result<JobFile, _> = serde_yaml::from_str("source: syslog\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_write_and_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jobs/metricbeat.yml");

        let mut job = JobFile::new(SourceKind::Metricbeat);
        job.query = Some("host.name:web-01".to_string());
        job.add_range("2025-01-02T00:00:00.000Z", "2025-01-03T00:00:00.000Z");
        job.write(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("source: metricbeat"));
        assert!(!content.contains("fixture"));

        assert_eq!(JobFile::read(&path).unwrap(), job);
    }

    #[test]
    fn test_read_missing_file() {
        let err = JobFile::read("/nonexistent/job.yml").unwrap_err();
        assert!(err.to_string().contains("Failed to read job file"));
    }
}
