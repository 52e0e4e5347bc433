//! CSV export of flat records

use crate::record::Record;
use eyre::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Write records to a CSV file, replacing its previous content
///
/// The header is the sorted union of every key seen across the records.
/// A record lacking a column gets an empty cell there.
pub struct CsvWriter {
    path: PathBuf,
}

impl CsvWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sorted union of keys across `records`
    pub fn header(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .flat_map(|record| record.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Write the header and one row per record
    ///
    /// Returns the number of rows written. When no record has any key the
    /// file is left empty, since a CSV without columns has no rows either.
    pub fn write(&self, records: &[Record]) -> Result<usize> {
        let header = Self::header(records);
        if header.is_empty() {
            std::fs::write(&self.path, "")
                .with_context(|| format!("Failed to write CSV file: {}", self.path.display()))?;
            log::debug!("No columns for {}, wrote empty file", self.path.display());
            return Ok(0);
        }

        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Failed to create CSV file: {}", self.path.display()))?;

        writer.write_record(&header)?;
        for record in records {
            writer.write_record(header.iter().map(|key| record.cell(key)))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write CSV file: {}", self.path.display()))?;

        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|row| row.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_header_is_sorted_union() {
        let records = vec![
            Record::new().with("b", 1).with("a", 2),
            Record::new().with("c", 3),
            Record::new(),
        ];
        assert_eq!(CsvWriter::header(&records), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_write_fills_missing_cells() {
        let temp = NamedTempFile::new().unwrap();
        let records = vec![
            Record::new().with("host", "web-01").with("pct", 0.5),
            Record::new()
                .with("host", "web-02")
                .with("errors", json!([{"type": "Timeout"}])),
        ];

        let count = CsvWriter::new(temp.path()).write(&records).unwrap();
        assert_eq!(count, 2);

        let rows = read_rows(temp.path());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["errors", "host", "pct"]);
        assert_eq!(rows[1], vec!["", "web-01", "0.5"]);
        assert_eq!(rows[2], vec![r#"[{"type":"Timeout"}]"#, "web-02", ""]);
    }

    #[test]
    fn test_quotes_commas_and_newlines() {
        let temp = NamedTempFile::new().unwrap();
        let message = "GET /a,b HTTP/1.1\n\"quoted\"";
        let records = vec![Record::new().with("message", message)];

        CsvWriter::new(temp.path()).write(&records).unwrap();

        let rows = read_rows(temp.path());
        assert_eq!(rows[1], vec![message]);
    }

    #[test]
    fn test_write_without_columns() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "stale").unwrap();

        let count = CsvWriter::new(temp.path())
            .write(&[Record::new(), Record::new()])
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(std::fs::read_to_string(temp.path()).unwrap(), "");
    }

    #[test]
    fn test_no_records_writes_empty_file() {
        let temp = NamedTempFile::new().unwrap();
        let count = CsvWriter::new(temp.path()).write(&[]).unwrap();
        assert_eq!(count, 0);
        assert_eq!(std::fs::read_to_string(temp.path()).unwrap(), "");
    }
}
