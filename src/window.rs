//! Time windows and timestamp formatting
//!
//! A harvest covers an overall `[start, end)` range that is cut into
//! contiguous windows of a fixed duration. Each window is extracted,
//! transformed and written on its own, and its bounds name the output
//! directory.

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeDelta, Utc};
use eyre::{Context, Result};

/// Textual timestamp format used in queries, logs and directory names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

// `%.f` reads nothing when the fractional part is absent, and numeric
// fields accept a single digit, so `2025-1-7T00:00:00Z` parses too.
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Parse a UTC timestamp such as `2025-01-01T00:00:00.000Z`
///
/// Falls back to RFC 3339 so offsets like `+07:00` are accepted as well.
/// Anything finer than a millisecond is truncated, so a parsed timestamp
/// always formats back to the value it is compared with.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    let ts = match NaiveDateTime::parse_from_str(value, PARSE_FORMAT) {
        Ok(naive) => naive.and_utc(),
        Err(_) => DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid timestamp: {}", value))?,
    };
    Ok(ts.trunc_subsecs(3))
}

/// Format a timestamp with millisecond precision and a `Z` suffix
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// A contiguous `[start, end)` time range processed as one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parse a window from two textual timestamps
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_timestamp(start)?, parse_timestamp(end)?))
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Duration in whole milliseconds, zero for empty or inverted windows
    pub fn duration_ms(&self) -> u64 {
        self.duration().num_milliseconds().max(0) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn start_str(&self) -> String {
        format_timestamp(&self.start)
    }

    pub fn end_str(&self) -> String {
        format_timestamp(&self.end)
    }

    /// Filesystem-friendly `<start>-<end>` label
    ///
    /// `:`, `T` and `.` are replaced with `_`, e.g.
    /// `2025-01-01_00_00_00_000Z-2025-01-01_00_00_04_000Z`.
    pub fn slug(&self) -> String {
        format!(
            "{}-{}",
            sanitize(&self.start_str()),
            sanitize(&self.end_str())
        )
    }

    /// Split this range into consecutive windows of `cut_off` length
    ///
    /// The final window is truncated to `end`. An empty range yields no
    /// windows.
    ///
    /// # Errors
    /// Returns an error if `cut_off` is not positive
    pub fn split(&self, cut_off: TimeDelta) -> Result<Vec<TimeWindow>> {
        if cut_off <= TimeDelta::zero() {
            eyre::bail!("Cut-off must be positive, got {}", cut_off);
        }

        let mut windows = Vec::new();
        let mut current = self.start;
        while current < self.end {
            let next = current
                .checked_add_signed(cut_off)
                .map_or(self.end, |next| next.min(self.end));
            windows.push(TimeWindow::new(current, next));
            current = next;
        }
        Ok(windows)
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start_str(), self.end_str())
    }
}

fn sanitize(ts: &str) -> String {
    ts.replace([':', 'T', '.'], "_")
}
