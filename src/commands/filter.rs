//! Include or exclude records by nested field values.
//!
//! # Usage
//!
//! ```bash
//! # Keep NOTICE events and anything done by one account
//! gcp-log filter include -f activity.json -o notice.json \
//!     -t "severity=NOTICE,protoPayload.authenticationInfo.principalEmail=ops@example.com"
//!
//! # Drop records that match any condition
//! gcp-log filter exclude -f activity.json -o rest.json -t "resource.type=gcs_bucket"
//! ```
//!
//! In include mode a record is written once for every condition it
//! matches; pass `--unique` to write it at most once. In exclude mode a
//! record is written only if it matches none of the conditions.

use crate::audit::filter::{FilterMode, FilterSet};
use crate::utils::context::RunContext;
use crate::utils::processor::{LogProcessor, ProcessStats};
use crate::utils::sink::Sink;
use anyhow::Result;
use tracing::info;

pub fn run(
    ctx: &mut RunContext,
    log_files: &[String],
    output: &str,
    mode: FilterMode,
    conditions: &str,
    unique: bool,
) -> Result<ProcessStats> {
    let filter = FilterSet::parse(mode, conditions)?.unique(unique);

    info!("{} logs that match the following conditions?", filter.mode());
    for condition in filter.conditions() {
        info!("[*] {}", condition);
    }
    ctx.confirm_or_abort()?;

    let mut sink = Sink::append(output)?;
    let stats = LogProcessor::new(log_files, "Filtering").process(ctx, |record, pctx| {
        for _ in 0..filter.evaluate(record) {
            sink.write_record(record)?;
            pctx.stats.forwarded += 1;
        }
        Ok(())
    })?;
    sink.finish()?;

    stats.report();
    Ok(stats)
}
