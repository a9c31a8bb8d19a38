//! Concatenate many log files into one.
//!
//! # Usage
//!
//! ```bash
//! # Every hourly file under a sink export, at any depth
//! gcp-log merge -f "./sink/cloudaudit.googleapis.com/*.json" -r -o merged.json
//! ```
//!
//! Files are copied byte for byte, without decoding, in sorted path order.
//! The output file is never treated as an input even if the pattern
//! matches it.

use crate::error::ToolboxError;
use crate::utils::context::RunContext;
use crate::utils::format::{format_bytes, format_number};
use crate::utils::listing::list_files;
use crate::utils::sink::Sink;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Files and bytes copied by one merge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub files: Vec<PathBuf>,
    pub bytes: u64,
}

pub fn run(ctx: &mut RunContext, pattern: &str, output: &str, recurse: bool) -> Result<MergeSummary> {
    let mut files = list_files(pattern, recurse)?;
    exclude_output(&mut files, Path::new(output));

    if files.is_empty() {
        return Err(ToolboxError::NoFilesIdentified(pattern.to_string()).into());
    }
    for file in &files {
        println!("{}", file.display());
    }
    eprintln!("{} files identified", format_number(files.len()));

    ctx.confirm_or_abort()?;
    info!("Merging files...");

    let bytes = merge_files(&files, output)?;
    eprintln!("Merged {} into {}", format_bytes(bytes), output);

    Ok(MergeSummary { files, bytes })
}

/// Append the raw content of each file to `output`, in the given order.
///
/// A file that cannot be opened aborts the merge; data already written
/// stays in `output`.
pub fn merge_files(files: &[PathBuf], output: &str) -> Result<u64> {
    let mut sink = Sink::append(output)?;
    for file in files {
        debug!("appending {}", file.display());
        let mut input = File::open(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
        sink.copy_from(&mut input)
            .with_context(|| format!("Failed to merge {}", file.display()))?;
    }
    let bytes = sink.bytes();
    sink.finish()?;
    Ok(bytes)
}

fn exclude_output(files: &mut Vec<PathBuf>, output: &Path) {
    let Ok(output) = output.canonicalize() else {
        return;
    };
    files.retain(|file| {
        let same = file.canonicalize().is_ok_and(|f| f == output);
        if same {
            warn!("Skipping output file {} found in listing", file.display());
        }
        !same
    });
}
