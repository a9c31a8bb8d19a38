//! Convert `gcloud logging read --format=json` output to one record per line.
//!
//! # Usage
//!
//! ```bash
//! gcloud logging read '<filter>' --freshness=7d --order=asc --format=json > array.json
//! gcp-log format -f array.json -o activity.json
//! ```
//!
//! The array is streamed, never loaded whole, so exports of any size work.
//! Output is appended, one compact JSON object per line, in input order.
//! An element that is never closed (truncated export) is dropped with a
//! warning.

use crate::audit::normalizer::Normalizer;
use crate::utils::context::RunContext;
use crate::utils::format::format_number;
use crate::utils::reader::open_lines;
use crate::utils::sink::Sink;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Counts from one formatting run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FormatSummary {
    pub records: usize,
    pub dropped: usize,
    pub lines: usize,
}

pub fn run(ctx: &RunContext, input: &str, output: &str) -> Result<FormatSummary> {
    debug!(
        "reformatting gcloud array {} to single line json file {}",
        input, output
    );

    let reader = open_lines(input)?;
    let mut sink = Sink::append(output)?;
    let progress = ctx.progress(None, "Formatting");

    let mut normalizer = Normalizer::new(reader);
    for record in normalizer.by_ref() {
        let record = record.with_context(|| format!("Failed to read {}", input))?;
        sink.write_line(&record)?;
        sink.count_record();
        progress.inc(1);
    }
    sink.finish()?;
    progress.finish_with_message("Formatting complete");

    let summary = FormatSummary {
        records: normalizer.emitted(),
        dropped: normalizer.dropped(),
        lines: normalizer.lines_read(),
    };

    if summary.dropped > 0 {
        warn!(
            "{} unterminated record(s) in {} were dropped",
            summary.dropped, input
        );
    }
    info!("Finished formatting {} to {}", input, output);
    eprintln!(
        "Wrote {} records from {} lines",
        format_number(summary.records),
        format_number(summary.lines)
    );

    Ok(summary)
}
