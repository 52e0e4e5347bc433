//! Regex-driven access log parsing

use crate::storage::TextReader;
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use eyre::{Context, Result};
use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use std::path::Path;

/// Pattern for reverse-proxy access lines shipped through a container runtime
///
/// ```text
/// kong stdout F 10.0.0.7 - - [22/Dec/2024:00:00:01 +0700] "GET /health HTTP/1.1" 200 12 "-" "kube-probe/1.29"
/// ```
pub const DEFAULT_PATTERN: &str = r#"^\S+ (?P<std>\S+) \S+ (?P<remote_address>\d+\.\d+\.\d+\.\d+) - (?P<remote_user>[^ ]*) \[(?P<datetime>[^\]]+)\] "(?P<method>\w+) (?P<path>[^\s]+) (?P<header>[^"]+)" (?P<status>\d+) (?P<bytes_sent>\d+) "(?P<referer>[^"]*)" "(?P<user_agent>[^"]*)""#;

/// Timestamp format of the `datetime` group
pub const DATETIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// HTTP method coerced to a numeric code where one is defined
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodCode {
    Get,
    Post,
    Other(String),
}

impl MethodCode {
    pub fn parse(method: &str) -> Self {
        match method {
            "GET" => Self::Get,
            "POST" => Self::Post,
            other => Self::Other(other.to_string()),
        }
    }

    /// `GET` is 0, `POST` is 1, other verbs have no code
    pub fn code(&self) -> Option<u8> {
        match self {
            Self::Get => Some(0),
            Self::Post => Some(1),
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for MethodCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Other(method) => write!(f, "{}", method),
        }
    }
}

// Coded methods export as their number, anything else as the verb
impl Serialize for MethodCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.code() {
            Some(code) => serializer.serialize_u8(code),
            None => serializer.serialize_str(&self.to_string()),
        }
    }
}

/// One parsed access log line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessLogEntry {
    pub std: String,
    pub remote_address: String,
    pub remote_user: String,
    pub datetime: DateTime<FixedOffset>,
    pub method: MethodCode,
    pub path: String,
    pub header: String,
    pub status: Option<u16>,
    pub bytes_sent: Option<u64>,
    pub referer: String,
    pub user_agent: String,
    pub day: u32,
    pub hour: u32,
    pub month: u32,
}

/// Parses access log lines with a named-group regular expression
///
/// The pattern must capture `datetime`; every other group is optional and
/// defaults to an empty value when the pattern does not define it.
pub struct AccessLogParser {
    pattern: Regex,
}

impl AccessLogParser {
    /// Parser for [`DEFAULT_PATTERN`]
    pub fn with_default_pattern() -> Result<Self> {
        Self::new(DEFAULT_PATTERN)
    }

    /// Compile a custom pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid access log pattern: {}", pattern))?;
        Ok(Self { pattern })
    }

    /// Parse one line, returning `None` if it does not match
    pub fn parse_line(&self, line: &str) -> Option<AccessLogEntry> {
        let caps = self.pattern.captures(line)?;
        let datetime = DateTime::parse_from_str(group(&caps, "datetime"), DATETIME_FORMAT).ok()?;

        Some(AccessLogEntry {
            std: group(&caps, "std").to_string(),
            remote_address: group(&caps, "remote_address").to_string(),
            remote_user: group(&caps, "remote_user").to_string(),
            method: MethodCode::parse(group(&caps, "method")),
            path: group(&caps, "path").to_string(),
            header: group(&caps, "header").to_string(),
            status: group(&caps, "status").parse().ok(),
            bytes_sent: group(&caps, "bytes_sent").parse().ok(),
            referer: group(&caps, "referer").to_string(),
            user_agent: group(&caps, "user_agent").to_string(),
            day: datetime.day(),
            hour: datetime.hour(),
            month: datetime.month(),
            datetime,
        })
    }

    /// Parse every matching line of `lines`, skipping the rest
    pub fn parse_lines<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Vec<AccessLogEntry> {
        lines
            .into_iter()
            .filter_map(|line| {
                let entry = self.parse_line(line);
                if entry.is_none() {
                    log::debug!("Skipping unmatched line: {}", line);
                }
                entry
            })
            .collect()
    }

    /// Parse a log file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<AccessLogEntry>> {
        let lines = TextReader::new(path).read()?;
        let entries = self.parse_lines(lines.iter().map(String::as_str));
        log::info!("Parsed {} of {} log entries", entries.len(), lines.len());
        Ok(entries)
    }
}

/// Export parsed entries as CSV, returning the number of rows written
pub fn write_csv(entries: &[AccessLogEntry], path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(entries.len())
}

fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map(|m| m.as_str()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GET_LINE: &str = r#"kong stdout F 10.0.0.7 - - [22/Dec/2024:13:05:01 +0700] "GET /health HTTP/1.1" 200 12 "-" "kube-probe/1.29""#;
    const POST_LINE: &str = r#"kong stderr F 172.16.4.20 - alice [23/Jan/2025:08:00:00 +0000] "POST /api/orders HTTP/2.0" 503 0 "https://shop.example" "Mozilla/5.0 (X11; Linux x86_64)""#;

    fn parser() -> AccessLogParser {
        AccessLogParser::with_default_pattern().unwrap()
    }

    #[test]
    fn test_parse_get_line() {
        let entry = parser().parse_line(GET_LINE).unwrap();

        assert_eq!(entry.std, "stdout");
        assert_eq!(entry.remote_address, "10.0.0.7");
        assert_eq!(entry.remote_user, "-");
        assert_eq!(entry.method, MethodCode::Get);
        assert_eq!(entry.method.code(), Some(0));
        assert_eq!(entry.path, "/health");
        assert_eq!(entry.header, "HTTP/1.1");
        assert_eq!(entry.status, Some(200));
        assert_eq!(entry.bytes_sent, Some(12));
        assert_eq!(entry.referer, "-");
        assert_eq!(entry.user_agent, "kube-probe/1.29");
        assert_eq!((entry.day, entry.hour, entry.month), (22, 13, 12));
    }

    #[test]
    fn test_parse_post_line() {
        let entry = parser().parse_line(POST_LINE).unwrap();
        assert_eq!(entry.method.code(), Some(1));
        assert_eq!(entry.remote_user, "alice");
        assert_eq!(entry.status, Some(503));
        assert_eq!(entry.user_agent, "Mozilla/5.0 (X11; Linux x86_64)");
    }

    #[test]
    fn test_other_method_keeps_verb() {
        let line = GET_LINE.replace("GET", "DELETE");
        let entry = parser().parse_line(&line).unwrap();
        assert_eq!(entry.method, MethodCode::Other("DELETE".to_string()));
        assert_eq!(entry.method.code(), None);
    }

    #[test]
    fn test_unmatched_lines_are_skipped() {
        let parser = parser();
        let bad_date = GET_LINE.replace("22/Dec/2024:13:05:01", "yesterday");
        let entries = parser.parse_lines([GET_LINE, "garbage", bad_date.as_str(), POST_LINE]);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_custom_pattern() {
        let parser = AccessLogParser::new(
            r#"^(?P<remote_address>\S+) \[(?P<datetime>[^\]]+)\] (?P<method>\w+) (?P<status>\S+)$"#,
        )
        .unwrap();

        let entry = parser
            .parse_line("10.1.1.1 [01/Feb/2025:23:59:59 +0000] PUT -")
            .unwrap();
        assert_eq!(entry.remote_address, "10.1.1.1");
        assert_eq!(entry.status, None);
        assert_eq!(entry.bytes_sent, None);
        assert_eq!(entry.user_agent, "");
        assert_eq!(entry.hour, 23);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(AccessLogParser::new("(unclosed").is_err());
    }

    #[test]
    fn test_parse_file_and_write_csv() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("access.log");
        std::fs::write(&log, format!("{}\nnot a log line\n{}\n", GET_LINE, POST_LINE)).unwrap();

        let entries = parser().parse_file(&log).unwrap();
        assert_eq!(entries.len(), 2);

        let csv_path = temp.path().join("parsed.csv");
        assert_eq!(write_csv(&entries, &csv_path).unwrap(), 2);

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "std");
        assert_eq!(&headers[4], "method");
        assert_eq!(&headers[13], "month");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][4], "0");
        assert_eq!(&rows[1][4], "1");
        assert_eq!(&rows[0][3], "2024-12-22T13:05:01+07:00");
    }
}
