//! Line-oriented record processing.
//!
//! Every record-level command (filter, timeslice, timeframe)
//! follows the same loop: stream each input file line by line, decode each
//! line into a [`Record`], and hand it to a command-specific handler.
//! [`LogProcessor`] owns that loop, the progress bar, and the bookkeeping
//! of lines that could not be decoded.

use crate::audit::record::Record;
use crate::utils::context::RunContext;
use crate::utils::format::{format_number, percentage};
use crate::utils::reader::{input_size, open_lines};
use anyhow::{Context, Result};
use std::io::BufRead;
use tracing::debug;

/// Statistics collected during log processing
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessStats {
    /// Total number of lines read across all files
    pub total_lines: usize,
    /// Lines that decoded into a record
    pub parsed_records: usize,
    /// Non-blank lines that failed to decode
    pub skipped_lines: usize,
    /// Records the handler wrote to the output
    pub forwarded: usize,
    /// Number of files processed
    pub files_processed: usize,
}

impl ProcessStats {
    /// Print a summary of processing statistics
    pub fn report(&self) {
        eprintln!("\nProcessing Summary:");
        eprintln!("  Files processed: {}", self.files_processed);
        eprintln!("  Total lines: {}", format_number(self.total_lines));
        eprintln!("  Parsed records: {}", format_number(self.parsed_records));
        if self.skipped_lines > 0 {
            eprintln!(
                "  Skipped lines: {} ({:.2}%)",
                format_number(self.skipped_lines),
                percentage(self.skipped_lines, self.total_lines)
            );
        }
        eprintln!("  Records written: {}", format_number(self.forwarded));
    }
}

/// Context provided to the record handler
pub struct ProcessContext {
    /// Current file being processed (0-indexed)
    pub file_index: usize,
    /// Line number within the current file (1-based)
    pub line_number: usize,
    /// Current file path
    pub file_path: String,
    /// Running statistics
    pub stats: ProcessStats,
}

/// Streams one-record-per-line files through a handler.
pub struct LogProcessor<'a> {
    files: &'a [String],
    progress_label: String,
}

impl<'a> LogProcessor<'a> {
    pub fn new(files: &'a [String], progress_label: &str) -> Self {
        Self {
            files,
            progress_label: progress_label.to_string(),
        }
    }

    /// Process all files in order with the given handler.
    ///
    /// The handler's error aborts processing and is returned with the file
    /// and line attached.
    pub fn process<F>(self, run: &RunContext, mut handler: F) -> Result<ProcessStats>
    where
        F: FnMut(&Record, &mut ProcessContext) -> Result<()>,
    {
        let mut context = ProcessContext {
            file_index: 0,
            line_number: 0,
            file_path: String::new(),
            stats: ProcessStats::default(),
        };

        for (file_idx, log_file) in self.files.iter().enumerate() {
            if self.files.len() > 1 || run.verbose() {
                eprintln!(
                    "[{}/{}] Processing: {}",
                    file_idx + 1,
                    self.files.len(),
                    log_file
                );
            }

            let file_size = input_size(log_file);
            let progress = run.progress(file_size, &self.progress_label);
            let reader = open_lines(log_file)?;

            context.file_index = file_idx;
            context.file_path = log_file.clone();
            context.line_number = 0;
            let mut bytes_read: u64 = 0;

            for line in reader.lines() {
                context.line_number += 1;
                context.stats.total_lines += 1;
                let line_number = context.line_number;

                let line = line.with_context(|| {
                    format!("Failed to read line {} from {}", line_number, log_file)
                })?;
                bytes_read += line.len() as u64 + 1;

                if line_number % 10_000 == 0 {
                    match file_size {
                        Some(_) => progress.update(bytes_read),
                        None => progress.update(line_number as u64),
                    }
                }

                if line.trim().is_empty() {
                    continue;
                }

                let record = match Record::decode(&line) {
                    Ok(record) => {
                        context.stats.parsed_records += 1;
                        record
                    }
                    Err(e) => {
                        context.stats.skipped_lines += 1;
                        debug!("Skipping line {} in {}: {:#}", line_number, log_file, e);
                        continue;
                    }
                };

                handler(&record, &mut context).with_context(|| {
                    format!("Handler failed at line {} in {}", line_number, log_file)
                })?;
            }

            progress.finish();
            context.stats.files_processed += 1;
        }

        Ok(context.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_log(lines: &[&str]) -> NamedTempFile {
        let mut temp = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(temp, "{}", line).unwrap();
        }
        temp.flush().unwrap();
        temp
    }

    #[test]
    fn test_process_empty_file() {
        let temp = NamedTempFile::new().unwrap();
        let files = vec![temp.path().to_string_lossy().to_string()];

        let stats = LogProcessor::new(&files, "Testing")
            .process(&RunContext::headless(), |_record, _ctx| Ok(()))
            .unwrap();

        assert_eq!(stats.total_lines, 0);
        assert_eq!(stats.parsed_records, 0);
        assert_eq!(stats.files_processed, 1);
    }

    #[test]
    fn test_process_skips_invalid_and_blank_lines() {
        let temp = temp_log(&[
            r#"{"insertId":"1","timestamp":"2019-07-22T20:04:31Z"}"#,
            "invalid json line",
            "",
            "[1,2]",
            r#"{"insertId":"2","timestamp":"2019-07-22T20:04:32Z"}"#,
        ]);
        let files = vec![temp.path().to_string_lossy().to_string()];

        let mut ids = Vec::new();
        let stats = LogProcessor::new(&files, "Testing")
            .process(&RunContext::headless(), |record, ctx| {
                ids.push((record.insert_id().unwrap().to_string(), ctx.line_number));
                Ok(())
            })
            .unwrap();

        assert_eq!(stats.total_lines, 5);
        assert_eq!(stats.parsed_records, 2);
        assert_eq!(stats.skipped_lines, 2);
        assert_eq!(ids, vec![("1".to_string(), 1), ("2".to_string(), 5)]);
    }

    #[test]
    fn test_handler_error_stops_processing() {
        let temp = temp_log(&[r#"{"insertId":"1"}"#, r#"{"insertId":"2"}"#]);
        let files = vec![temp.path().to_string_lossy().to_string()];

        let mut seen = 0;
        let result = LogProcessor::new(&files, "Testing").process(
            &RunContext::headless(),
            |_record, _ctx| {
                seen += 1;
                anyhow::bail!("sink closed")
            },
        );
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_multiple_files_in_order() {
        let a = temp_log(&[r#"{"n":1}"#, r#"{"n":2}"#]);
        let b = temp_log(&[r#"{"n":3}"#]);
        let files = vec![
            a.path().to_string_lossy().to_string(),
            b.path().to_string_lossy().to_string(),
        ];

        let mut order = Vec::new();
        let stats = LogProcessor::new(&files, "Testing")
            .process(&RunContext::headless(), |record, ctx| {
                order.push((ctx.file_index, record.get("n").unwrap().as_u64().unwrap()));
                Ok(())
            })
            .unwrap();

        assert_eq!(order, vec![(0, 1), (0, 2), (1, 3)]);
        assert_eq!(stats.files_processed, 2);
    }
}
