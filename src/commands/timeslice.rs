//! Extract records around a point in time.
//!
//! # Usage
//!
//! ```bash
//! # 60 minutes centred on the incident: 20:34:31 .. 21:34:31
//! gcp-log timeslice "2019-07-22 21:04:31" -s 60 -f activity.json -o slice.json
//! ```
//!
//! The slice spans `size` minutes in total, half before and half after the
//! given time, both ends inclusive. Fractional sizes are allowed.

use crate::audit::window::TimeWindow;
use crate::commands::timeframe::extract_window;
use crate::utils::context::RunContext;
use crate::utils::processor::ProcessStats;
use crate::utils::time::parse_operator_time;
use anyhow::Result;

/// Default slice width in minutes.
pub const DEFAULT_SIZE_MINUTES: f64 = 30.0;

pub fn run(
    ctx: &mut RunContext,
    log_files: &[String],
    output: &str,
    center: &str,
    size_minutes: f64,
) -> Result<ProcessStats> {
    let center = parse_operator_time(center)?;
    let window = TimeWindow::centered(center, size_minutes)?;
    extract_window(ctx, log_files, output, &window)
}
