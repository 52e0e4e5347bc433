//! Terminal summaries of parsed access logs

use super::{AccessLogEntry, Severity};
use owo_colors::OwoColorize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::hash::Hash;

const BAR_WIDTH: u64 = 40;

/// Valid and failed (status >= 400) requests within one hour of the day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourlyRequests {
    pub valid: usize,
    pub errors: usize,
}

/// Aggregates over a set of parsed access log entries
#[derive(Debug, Clone, PartialEq)]
pub struct AccessLogReport {
    pub total: usize,
    /// Hour of day → valid/error counts
    pub hourly_requests: BTreeMap<u32, HourlyRequests>,
    /// Method verb → count, most frequent first
    pub methods: Vec<(String, usize)>,
    /// Hour of day → bytes sent
    pub bytes_per_hour: BTreeMap<u32, u64>,
    /// Severity → count, most frequent first
    pub severities: Vec<(Severity, usize)>,
    /// Top user agents, most frequent first
    pub user_agents: Vec<(String, usize)>,
}

impl AccessLogReport {
    /// Aggregate `entries`, keeping the `top` most common user agents
    pub fn build(entries: &[AccessLogEntry], top: usize) -> Self {
        let mut hourly_requests: BTreeMap<u32, HourlyRequests> = BTreeMap::new();
        let mut bytes_per_hour: BTreeMap<u32, u64> = BTreeMap::new();
        let mut methods: HashMap<String, usize> = HashMap::new();
        let mut severities: HashMap<Severity, usize> = HashMap::new();
        let mut user_agents: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let hour = hourly_requests.entry(entry.hour).or_default();
            match entry.status {
                Some(status) if status >= 400 => hour.errors += 1,
                _ => hour.valid += 1,
            }
            *bytes_per_hour.entry(entry.hour).or_default() += entry.bytes_sent.unwrap_or(0);
            *methods.entry(entry.method.to_string()).or_default() += 1;
            *severities.entry(Severity::from_status(entry.status)).or_default() += 1;
            *user_agents.entry(entry.user_agent.clone()).or_default() += 1;
        }

        let mut user_agents = ranked(user_agents);
        user_agents.truncate(top);

        Self {
            total: entries.len(),
            hourly_requests,
            methods: ranked(methods),
            bytes_per_hour,
            severities: ranked(severities),
            user_agents,
        }
    }

    /// Render every chart as colored text
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", "Parsed entries:".bold(), self.total);

        section(&mut out, "Errors and valid requests per hour");
        let max = self
            .hourly_requests
            .values()
            .map(|h| h.valid.max(h.errors) as u64)
            .max()
            .unwrap_or(0);
        for (hour, counts) in &self.hourly_requests {
            let _ = writeln!(
                out,
                "{:02}h valid  {} {}",
                hour,
                bar(counts.valid as u64, max).green(),
                counts.valid
            );
            let _ = writeln!(
                out,
                "    errors {} {}",
                bar(counts.errors as u64, max).red(),
                counts.errors
            );
        }

        section(&mut out, "Request methods");
        let rows: Vec<(String, u64)> = self
            .methods
            .iter()
            .map(|(method, count)| {
                let pct = percent(*count, self.total);
                (format!("{} ({:.1}%)", method, pct), *count as u64)
            })
            .collect();
        bars(&mut out, &rows);

        section(&mut out, "Bytes sent per hour");
        let rows: Vec<(String, u64)> = self
            .bytes_per_hour
            .iter()
            .map(|(hour, bytes)| (format!("{:02}h", hour), *bytes))
            .collect();
        bars(&mut out, &rows);

        section(&mut out, "Log level distribution");
        let rows: Vec<(String, u64)> = self
            .severities
            .iter()
            .map(|(severity, count)| (severity.to_string(), *count as u64))
            .collect();
        bars(&mut out, &rows);

        section(&mut out, "Top user agents");
        let rows: Vec<(String, u64)> = self
            .user_agents
            .iter()
            .map(|(agent, count)| (agent.clone(), *count as u64))
            .collect();
        bars(&mut out, &rows);

        out
    }
}

/// Sort by count descending, then key ascending
fn ranked<K: Ord + Hash>(counts: HashMap<K, usize>) -> Vec<(K, usize)> {
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title.bold().underline());
}

fn bars(out: &mut String, rows: &[(String, u64)]) {
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let max = rows.iter().map(|(_, value)| *value).max().unwrap_or(0);

    for (label, value) in rows {
        let _ = writeln!(
            out,
            "{:<width$} {} {}",
            label,
            bar(*value, max).cyan(),
            value,
            width = label_width
        );
    }
}

fn bar(value: u64, max: u64) -> String {
    if value == 0 || max == 0 {
        return String::new();
    }
    let width = (value * BAR_WIDTH).div_ceil(max).max(1);
    "█".repeat(width as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_log::AccessLogParser;

    fn entries() -> Vec<AccessLogEntry> {
        let lines = [
            r#"kong stdout F 10.0.0.1 - - [22/Dec/2024:09:00:00 +0000] "GET / HTTP/1.1" 200 100 "-" "curl/8.0""#,
            r#"kong stdout F 10.0.0.2 - - [22/Dec/2024:09:10:00 +0000] "GET /missing HTTP/1.1" 404 50 "-" "curl/8.0""#,
            r#"kong stdout F 10.0.0.3 - - [22/Dec/2024:10:00:00 +0000] "POST /api HTTP/1.1" 503 0 "-" "Mozilla/5.0""#,
            r#"kong stdout F 10.0.0.4 - - [22/Dec/2024:10:30:00 +0000] "DELETE /api/1 HTTP/1.1" 301 25 "-" "kube-probe/1.29""#,
        ];
        AccessLogParser::with_default_pattern()
            .unwrap()
            .parse_lines(lines)
    }

    #[test]
    fn test_aggregates() {
        let report = AccessLogReport::build(&entries(), 10);

        assert_eq!(report.total, 4);
        assert_eq!(
            report.hourly_requests[&9],
            HourlyRequests {
                valid: 1,
                errors: 1
            }
        );
        assert_eq!(
            report.hourly_requests[&10],
            HourlyRequests {
                valid: 1,
                errors: 1
            }
        );
        assert_eq!(report.bytes_per_hour[&9], 150);
        assert_eq!(report.bytes_per_hour[&10], 25);
        assert_eq!(
            report.methods,
            vec![
                ("GET".to_string(), 2),
                ("DELETE".to_string(), 1),
                ("POST".to_string(), 1)
            ]
        );
        assert_eq!(
            report.severities,
            vec![
                (Severity::Info, 1),
                (Severity::Warning, 1),
                (Severity::Error, 1),
                (Severity::Critical, 1)
            ]
        );
    }

    #[test]
    fn test_top_user_agents() {
        let report = AccessLogReport::build(&entries(), 2);
        assert_eq!(
            report.user_agents,
            vec![("curl/8.0".to_string(), 2), ("Mozilla/5.0".to_string(), 1)]
        );
    }

    #[test]
    fn test_render_mentions_every_chart() {
        let rendered = AccessLogReport::build(&entries(), 10).render();
        assert!(rendered.contains("Errors and valid requests per hour"));
        assert!(rendered.contains("GET (50.0%)"));
        assert!(rendered.contains("CRITICAL"));
        assert!(rendered.contains("kube-probe/1.29"));
    }

    #[test]
    fn test_empty_report() {
        let report = AccessLogReport::build(&[], 10);
        assert_eq!(report.total, 0);
        assert!(report.methods.is_empty());
        assert!(report.render().contains("Parsed entries:"));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(10, 10).chars().count(), 40);
        assert_eq!(bar(1, 1000).chars().count(), 1);
    }
}
