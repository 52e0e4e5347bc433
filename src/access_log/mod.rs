//! Access log analysis
//!
//! Parses web-server access logs (for example the raw lines exported by the
//! `kong` source) into typed entries and summarises them for the terminal.

mod parser;
mod report;
mod severity;

pub use parser::{AccessLogEntry, AccessLogParser, DEFAULT_PATTERN, MethodCode, write_csv};
pub use report::{AccessLogReport, HourlyRequests};
pub use severity::Severity;
