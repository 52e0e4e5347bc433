//! Status-code severity buckets

use serde::Serialize;

/// Severity derived from an HTTP status code
///
/// 5xx responses map to `CRITICAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Classify a status code; a missing status is `DEBUG`
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(200..=299) => Self::Info,
            Some(300..=399) => Self::Warning,
            Some(400..=499) => Self::Error,
            Some(500..=599) => Self::Critical,
            _ => Self::Debug,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
