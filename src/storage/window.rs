//! Per-window output artifacts

use super::{CsvWriter, TextWriter};
use crate::etl::Loader;
use crate::record::Record;
use crate::sources::LogSource;
use crate::window::TimeWindow;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Writes a window's records to `<save_dir>/<name>-<start>-<end>/`
///
/// The directory holds `<name>.txt` (one line per record) and `<name>.csv`.
/// Both files are rewritten on every load, so re-running a window replaces
/// its previous output.
pub struct WindowWriter {
    save_dir: PathBuf,
    source: Arc<dyn LogSource>,
    window: TimeWindow,
}

impl WindowWriter {
    pub fn new(save_dir: impl AsRef<Path>, source: Arc<dyn LogSource>, window: TimeWindow) -> Self {
        Self {
            save_dir: save_dir.as_ref().to_path_buf(),
            source,
            window,
        }
    }

    /// Directory receiving this window's artifacts
    pub fn output_dir(&self) -> PathBuf {
        self.save_dir
            .join(format!("{}-{}", self.source.name(), self.window.slug()))
    }

    pub fn text_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.txt", self.source.name()))
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.csv", self.source.name()))
    }

    /// Write both artifacts, returning the number of records written
    pub fn write(&self, records: &[Record]) -> Result<usize> {
        let dir = self.output_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

        let lines = records
            .iter()
            .map(|record| self.source.text_line(record))
            .collect::<Result<Vec<_>>>()?;
        TextWriter::new(self.text_path()).write(&lines)?;

        let rows = CsvWriter::new(self.csv_path()).write(records)?;
        log::debug!(
            "Wrote {} line(s) and {} row(s) to {}",
            lines.len(),
            rows,
            dir.display()
        );

        Ok(records.len())
    }
}

impl Loader for WindowWriter {
    type Item = Record;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        self.write(&items)
    }
}
