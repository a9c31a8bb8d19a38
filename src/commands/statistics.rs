//! Summary statistics for one or more line-per-record log files.
//!
//! # Usage
//!
//! ```bash
//! gcp-log statistics -f activity.json
//! gcp-log statistics -f day1.json -f day2.json.gz --top 10 --csv counts.csv
//! ```
//!
//! # Output
//!
//! - Total log count
//! - Chronology (oldest and most recent `timestamp`)
//! - Counts by `resource.type`
//! - Counts by account (`protoPayload.authenticationInfo.principalEmail`)
//! - Counts by `severity`
//!
//! Records missing a field are counted under `no value`. Multiple files are
//! read in parallel.

use crate::audit::path::FieldPath;
use crate::audit::record::{value_as_text, Record};
use crate::utils::format::{format_number, percentage};
use crate::utils::parallel::process_files_parallel;
use crate::utils::reader::open_lines;
use crate::utils::time::{duration_human, format_utc, parse_record_timestamp, parse_timestamp};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

/// Placeholder for a missing field.
pub const NO_VALUE: &str = "no value";

const RESOURCE_TYPE: &str = "resource.type";
const ACCOUNT: &str = "protoPayload.authenticationInfo.principalEmail";
const SEVERITY: &str = "severity";

/// Aggregated statistics across all processed files.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogStatistics {
    pub total: usize,
    pub skipped_lines: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    pub by_resource_type: HashMap<String, usize>,
    pub by_account: HashMap<String, usize>,
    pub by_severity: HashMap<String, usize>,
}

impl LogStatistics {
    fn observe(&mut self, record: &Record, fields: &Fields) {
        self.total += 1;

        if let Some(ts) = record.timestamp_text().and_then(record_instant) {
            self.oldest = Some(self.oldest.map_or(ts, |o| o.min(ts)));
            self.newest = Some(self.newest.map_or(ts, |n| n.max(ts)));
        }

        bump(&mut self.by_resource_type, record, &fields.resource_type);
        bump(&mut self.by_account, record, &fields.account);
        bump(&mut self.by_severity, record, &fields.severity);
    }

    fn merge(&mut self, other: Self) {
        self.total += other.total;
        self.skipped_lines += other.skipped_lines;
        self.oldest = match (self.oldest, other.oldest) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.newest = match (self.newest, other.newest) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        for (mine, theirs) in [
            (&mut self.by_resource_type, other.by_resource_type),
            (&mut self.by_account, other.by_account),
            (&mut self.by_severity, other.by_severity),
        ] {
            for (key, count) in theirs {
                *mine.entry(key).or_insert(0) += count;
            }
        }
    }
}

struct Fields {
    resource_type: FieldPath,
    account: FieldPath,
    severity: FieldPath,
}

impl Fields {
    fn new() -> Result<Self> {
        Ok(Self {
            resource_type: FieldPath::parse(RESOURCE_TYPE)?,
            account: FieldPath::parse(ACCOUNT)?,
            severity: FieldPath::parse(SEVERITY)?,
        })
    }
}

fn bump(counts: &mut HashMap<String, usize>, record: &Record, path: &FieldPath) {
    let key = record
        .lookup(path)
        .map(value_as_text)
        .unwrap_or_else(|| NO_VALUE.to_string());
    *counts.entry(key).or_insert(0) += 1;
}

/// Full-precision instant of a record timestamp, falling back to the
/// second-resolution prefix read as UTC.
fn record_instant(ts: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(ts)
        .ok()
        .or_else(|| parse_record_timestamp(ts).ok().map(|naive| naive.and_utc()))
}

fn file_statistics(file_path: &str) -> Result<LogStatistics> {
    debug!("calculating statistics for {}", file_path);
    let fields = Fields::new()?;
    let mut stats = LogStatistics::default();

    for (idx, line) in open_lines(file_path)?.lines().enumerate() {
        let line =
            line.with_context(|| format!("Failed to read line {} from {}", idx + 1, file_path))?;
        if line.trim().is_empty() {
            continue;
        }
        match Record::decode(&line) {
            Ok(record) => stats.observe(&record, &fields),
            Err(_) => stats.skipped_lines += 1,
        }
    }

    Ok(stats)
}

/// Compute statistics for `log_files`, reading files in parallel.
pub fn collect(log_files: &[String]) -> Result<LogStatistics> {
    process_files_parallel(log_files, file_statistics, |results| {
        results
            .into_iter()
            .fold(LogStatistics::default(), |mut acc, result| {
                acc.merge(result.data);
                acc
            })
    })
}

/// Counts sorted by descending count, then by value.
pub fn ranked(counts: &HashMap<String, usize>) -> Vec<(&str, usize)> {
    let mut sorted: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
}

#[derive(Debug, Serialize)]
struct CountRow<'a> {
    category: &'a str,
    value: &'a str,
    count: usize,
}

fn export_csv(stats: &LogStatistics, path: &str) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path))?;
    for (category, counts) in [
        ("resource_type", &stats.by_resource_type),
        ("account", &stats.by_account),
        ("severity", &stats.by_severity),
    ] {
        for (value, count) in ranked(counts) {
            writer.serialize(CountRow {
                category,
                value,
                count,
            })?;
        }
    }
    writer.flush().with_context(|| format!("Failed to write {}", path))?;
    Ok(())
}

fn print_header(title: &str) {
    println!("---------------------");
    println!("{}", title);
    println!("---------------------");
}

fn print_counts(counts: &HashMap<String, usize>, total: usize, top: usize) {
    let rows = ranked(counts);
    let shown = if top == 0 { rows.len() } else { top.min(rows.len()) };
    let width = rows[..shown]
        .iter()
        .map(|(value, _)| value.len())
        .max()
        .unwrap_or(0)
        .max(5);

    for (value, count) in &rows[..shown] {
        println!(
            "{:<width$}  {:>10}  {:>6.2}%",
            value,
            format_number(*count),
            percentage(*count, total),
            width = width
        );
    }
    if shown < rows.len() {
        println!("... and {} more", format_number(rows.len() - shown));
    }
    println!();
}

pub fn run(log_files: &[String], top: usize, csv_output: Option<&str>) -> Result<LogStatistics> {
    let stats = collect(log_files)?;

    print_header("Total log count");
    println!("{}", format_number(stats.total));
    if stats.skipped_lines > 0 {
        println!(
            "({} undecodable lines skipped)",
            format_number(stats.skipped_lines)
        );
    }
    println!();

    print_header("Chronology");
    match (&stats.oldest, &stats.newest) {
        (Some(oldest), Some(newest)) => {
            println!("Oldest Log: {}", format_utc(oldest));
            println!("Most Recent Log: {}", format_utc(newest));
            println!("Time span: {}", duration_human(oldest, newest));
        }
        _ => println!("No timestamps found"),
    }
    println!();

    print_header("Logs by resource.type");
    print_counts(&stats.by_resource_type, stats.total, top);

    print_header("Logs by account");
    print_counts(&stats.by_account, stats.total, top);

    print_header("Logs by severity");
    print_counts(&stats.by_severity, stats.total, top);

    if let Some(path) = csv_output {
        export_csv(&stats, path)?;
        eprintln!("Counts written to {}", path);
    }

    Ok(stats)
}
