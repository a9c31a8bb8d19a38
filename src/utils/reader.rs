//! Record stream source.
//!
//! Log sinks in Cloud Storage and local archives are frequently gzip or
//! zstd compressed. Inputs are opened through [`open_file`], which picks a
//! decoder from the file extension so every command streams compressed and
//! plain files the same way. `-` reads standard input.
//!
//! ```no_run
//! use gcp_log_tools::utils::reader::open_lines;
//! use std::io::BufRead;
//!
//! for line in open_lines("activity.json.gz").unwrap().lines() {
//!     let line = line.unwrap();
//!     // one JSON record per line
//! }
//! ```

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reader buffer size; audit records routinely exceed the 8 KiB default.
const BUFFER_CAPACITY: usize = 256 * 1024;

/// Opens a file with automatic decompression based on extension.
///
/// - `.gz` → gzip (multi-member streams included)
/// - `.zst` → zstandard
/// - `-` → standard input
/// - anything else → plain file
pub fn open_file(path: impl AsRef<Path>) -> Result<Box<dyn Read + Send>> {
    let path = path.as_ref();
    if path == Path::new("-") {
        return Ok(Box::new(std::io::stdin()));
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "gz" => Ok(Box::new(MultiGzDecoder::new(file))),
        "zst" => {
            let decoder = zstd::Decoder::new(file).with_context(|| {
                format!("Failed to create zstd decoder for: {}", path.display())
            })?;
            Ok(Box::new(decoder))
        }
        _ => Ok(Box::new(file)),
    }
}

/// [`open_file`] wrapped in a large line buffer.
pub fn open_lines(path: impl AsRef<Path>) -> Result<BufReader<Box<dyn Read + Send>>> {
    Ok(BufReader::with_capacity(BUFFER_CAPACITY, open_file(path)?))
}

/// On-disk size used to scale progress bars; `None` for stdin or on error.
///
/// For compressed inputs this is the compressed size, so byte progress is
/// only an estimate there.
pub fn input_size(path: impl AsRef<Path>) -> Option<u64> {
    let path = path.as_ref();
    if path == Path::new("-") {
        return None;
    }
    std::fs::metadata(path).ok().map(|m| m.len())
}
