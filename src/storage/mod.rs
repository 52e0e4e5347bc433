//! File system storage operations
//!
//! This module handles all file output of a harvest:
//! - Line-delimited text files
//! - CSV files with a header computed from the records
//! - Per-window artifact directories

mod csv_file;
mod text;
mod window;

pub use csv_file::CsvWriter;
pub use text::{TextReader, TextWriter};
pub use window::WindowWriter;
