//! Line-delimited text files

use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Read text lines from a file
pub struct TextReader {
    path: PathBuf,
}

impl TextReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read all non-empty lines
    pub fn read(&self) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read text file: {}", self.path.display()))?;

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(String::from)
            .collect())
    }
}

/// Write lines to a file, replacing its previous content
pub struct TextWriter {
    path: PathBuf,
}

impl TextWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write lines newline-joined, with a trailing newline when non-empty
    pub fn write(&self, lines: &[String]) -> Result<()> {
        let content = if lines.is_empty() {
            String::new()
        } else {
            format!("{}\n", lines.join("\n"))
        };

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write text file: {}", self.path.display()))?;

        Ok(())
    }
}
