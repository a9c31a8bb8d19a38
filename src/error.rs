//! Error kinds raised by the log pipeline.
//!
//! Commands return `anyhow::Result` and attach file/record context as they
//! go; these variants are the failures callers may want to match on
//! (configuration mistakes, a declined confirmation, a failed write).

use thiserror::Error;

/// Deepest field path accepted by the filter engine.
pub const MAX_PATH_DEPTH: usize = 6;

#[derive(Debug, Error)]
pub enum ToolboxError {
    #[error("field path is empty")]
    EmptyPath,

    #[error("field path '{path}' has {depth} segments (maximum is {max})", max = MAX_PATH_DEPTH)]
    PathTooDeep { path: String, depth: usize },

    #[error("invalid filter condition '{0}': expected path=value")]
    InvalidCondition(String),

    /// Not exactly one `>` separator, or a start later than the end.
    #[error("malformed time range '{0}': expected \"YYYY-MM-DD HH:MM:SS > YYYY-MM-DD HH:MM:SS\"")]
    MalformedRange(String),

    #[error("failed to parse date/time '{0}': expected YYYY-MM-DD HH:MM:SS")]
    InvalidTime(String),

    #[error("time slice size must be a non-negative number of minutes, got {0}")]
    InvalidRadius(f64),

    #[error("no files identified for '{0}'. Did you mean to --recurse?")]
    NoFilesIdentified(String),

    #[error("no objects identified in bucket '{0}'")]
    NoObjectsIdentified(String),

    #[error("operation aborted by user")]
    Aborted,

    #[error("failed to write {target}")]
    WriteFailed { target: String },
}
