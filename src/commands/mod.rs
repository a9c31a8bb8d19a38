//! Command implementations for working with exported GCP audit logs.
//!
//! Each module implements one subcommand and exposes a `run` function that
//! takes already-parsed arguments and a [`RunContext`](crate::utils::context::RunContext).
//!
//! ## Preparing logs
//!
//! - [`download`] - Fetch sink exports from a Cloud Storage bucket
//! - [`merge`] - Concatenate many exported files into one
//! - [`format`] - Convert `gcloud logging read --format json` output to one record per line
//!
//! ## Narrowing logs
//!
//! - [`filter`] - Include or exclude records by nested field values
//! - [`timeslice`] - Records within a window centred on a time
//! - [`timeframe`] - Records between two explicit times
//!
//! ## Summaries
//!
//! - [`statistics`] - Totals, chronology and counts by resource type, account and severity
//!
//! Commands that write output append to the target file and ask for
//! confirmation first, unless `--accept-all` is given.

pub mod download;
pub mod filter;
pub mod format;
pub mod merge;
pub mod statistics;
pub mod timeframe;
pub mod timeslice;
