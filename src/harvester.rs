//! Windowed harvest orchestration
//!
//! Splits an overall time range into cut-off sized windows and runs one
//! extract → transform → load [`Pipeline`] per window, strictly in
//! ascending order.

use crate::etl::Pipeline;
use crate::search::{PagingOptions, SearchBackend, SearchExtractor};
use crate::sources::{LogSource, SourceTransformer};
use crate::storage::WindowWriter;
use crate::window::TimeWindow;
use chrono::TimeDelta;
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default window length in seconds
pub const DEFAULT_CUT_OFF_SECS: u64 = 4000;

/// Default root directory for window artifacts
pub const DEFAULT_SAVE_DIR: &str = "./logs";

/// Outcome of a harvest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub windows: usize,
    pub records: usize,
}

impl std::ops::AddAssign for RunSummary {
    fn add_assign(&mut self, other: Self) {
        self.windows += other.windows;
        self.records += other.records;
    }
}

/// Generic windowed pipeline parameterised by a [`LogSource`]
///
/// # Example
/// ```no_run
/// use log_harvester::harvester::WindowedPipeline;
/// use log_harvester::search::FixtureBackend;
/// use log_harvester::sources::SourceKind;
/// use log_harvester::window::TimeWindow;
///
/// # async fn example() -> eyre::Result<()> {
/// let pipeline = WindowedPipeline::new(
///     FixtureBackend::new("metricbeat.json"),
///     SourceKind::Metricbeat.build(None),
///     "./logs",
/// )
/// .with_cut_off_secs(3600);
///
/// let range = TimeWindow::parse("2025-01-02T00:00:00.000Z", "2025-01-03T00:00:00.000Z")?;
/// let summary = pipeline.run(&range).await?;
/// println!("{} windows, {} records", summary.windows, summary.records);
/// # Ok(())
/// # }
/// ```
pub struct WindowedPipeline<B> {
    backend: B,
    source: Arc<dyn LogSource>,
    save_dir: PathBuf,
    paging: PagingOptions,
    cut_off_secs: u64,
}

impl<B: SearchBackend> WindowedPipeline<B> {
    pub fn new(backend: B, source: Arc<dyn LogSource>, save_dir: impl AsRef<Path>) -> Self {
        Self {
            backend,
            source,
            save_dir: save_dir.as_ref().to_path_buf(),
            paging: PagingOptions::default(),
            cut_off_secs: DEFAULT_CUT_OFF_SECS,
        }
    }

    pub fn with_paging(mut self, paging: PagingOptions) -> Self {
        self.paging = paging;
        self
    }

    pub fn with_cut_off_secs(mut self, cut_off_secs: u64) -> Self {
        self.cut_off_secs = cut_off_secs;
        self
    }

    /// Windows `range` is processed in
    pub fn windows(&self, range: &TimeWindow) -> Result<Vec<TimeWindow>> {
        let secs = i64::try_from(self.cut_off_secs)
            .with_context(|| format!("Cut-off too large: {}", self.cut_off_secs))?;
        let cut_off = TimeDelta::try_seconds(secs)
            .ok_or_else(|| eyre::eyre!("Cut-off too large: {}", self.cut_off_secs))?;
        range.split(cut_off)
    }

    /// Harvest every window of `range`
    ///
    /// # Errors
    /// Returns an error for invalid paging/cut-off settings or when writing
    /// a window's artifacts fails. Failed page requests are not errors.
    pub async fn run(&self, range: &TimeWindow) -> Result<RunSummary> {
        self.paging.validate()?;
        let windows = self.windows(range)?;
        if windows.is_empty() {
            log::warn!("Empty time range {}, nothing to harvest", range);
        }

        let mut summary = RunSummary::default();
        for window in windows {
            log::info!(
                "Getting {} logs from {} to {}",
                self.source.name().cyan(),
                window.start_str().bright_black(),
                window.end_str().bright_black()
            );

            let pipeline = Pipeline::new(
                SearchExtractor::new(&self.backend, self.source.clone(), window, self.paging),
                SourceTransformer::new(self.source.clone()),
                WindowWriter::new(&self.save_dir, self.source.clone(), window),
            );
            let records = pipeline
                .run()
                .await
                .with_context(|| format!("Failed to harvest window {}", window))?;

            summary += RunSummary {
                windows: 1,
                records,
            };
        }

        Ok(summary)
    }
}
