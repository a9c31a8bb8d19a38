//! Extract records between two explicit times.
//!
//! # Usage
//!
//! ```bash
//! gcp-log timeframe "2019-07-22 20:00:00 > 2019-07-22 21:30:00" -f activity.json -o window.json
//! ```
//!
//! Both bounds are inclusive. Record timestamps are compared to the second
//! (`YYYY-MM-DDTHH:MM:SS`); records without a parseable `timestamp` are
//! skipped.

use crate::audit::window::TimeWindow;
use crate::utils::context::RunContext;
use crate::utils::format::format_number;
use crate::utils::processor::{LogProcessor, ProcessStats};
use crate::utils::sink::Sink;
use crate::utils::time::format_timestamp;
use anyhow::Result;
use tracing::{debug, info};

pub fn run(
    ctx: &mut RunContext,
    log_files: &[String],
    output: &str,
    range: &str,
) -> Result<ProcessStats> {
    let window = TimeWindow::parse_range(range)?;
    extract_window(ctx, log_files, output, &window)
}

/// Write every record inside `window` to `output`, in input order.
///
/// Shared by `timeframe` and `timeslice`; logs the bounds and asks for
/// confirmation before reading any input.
pub fn extract_window(
    ctx: &mut RunContext,
    log_files: &[String],
    output: &str,
    window: &TimeWindow,
) -> Result<ProcessStats> {
    info!("Start Date/Time: {}", format_timestamp(&window.start));
    info!("End Date/Time: {}", format_timestamp(&window.end));
    ctx.confirm_or_abort()?;

    let mut untimed = 0usize;
    let mut sink = Sink::append(output)?;
    let stats = LogProcessor::new(log_files, "Extracting").process(ctx, |record, pctx| {
        match record.timestamp() {
            Some(t) if window.contains(t) => {
                sink.write_record(record)?;
                pctx.stats.forwarded += 1;
            }
            Some(_) => {}
            None => {
                untimed += 1;
                debug!(
                    "No usable timestamp at line {} in {}",
                    pctx.line_number, pctx.file_path
                );
            }
        }
        Ok(())
    })?;
    sink.finish()?;

    if untimed > 0 {
        info!(
            "Skipped {} records without a usable timestamp",
            format_number(untimed)
        );
    }
    stats.report();
    Ok(stats)
}
