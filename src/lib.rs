//! # GCP Log Tools
//!
//! Command-line tools for preparing and triaging Google Cloud audit logs
//! exported by a log sink or by `gcloud logging read`.
//!
//! ## Overview
//!
//! Audit logs reach an investigator in two shapes: hourly files of one JSON
//! record per line (log sink exports to Cloud Storage) or a single
//! pretty-printed JSON array (`gcloud logging read --format=json`). This
//! crate normalizes both to the line-per-record form and then narrows,
//! merges and summarizes them. Every command streams its input, so files
//! larger than memory are fine.
//!
//! ## Features
//!
//! - **Download** sink exports from a bucket, with wildcard selection
//! - **Merge** many exported files into one, recursively
//! - **Format** `gcloud` JSON arrays to one record per line
//! - **Filter** by nested field values in include or exclude mode
//! - **Time slicing** around a point in time or between two times
//! - **Statistics** by resource type, account and severity (parallel)
//! - **Compressed File Support** - `.gz` and `.zst` inputs are read directly
//! - **Shell completion** for bash, zsh, fish, powershell, and elvish
//!
//! ## Architecture
//!
//! - [`audit`] - Records, field paths, filters, time windows and the array normalizer
//! - [`commands`] - One module per subcommand
//! - [`utils`] - Shared I/O, prompting, progress, listing and storage helpers
//! - [`error`] - Error kinds callers can match on
//!
//! ## Example Usage
//!
//! ```bash
//! # Fetch a day of activity logs and merge them
//! gcp-log download -b myproject-logarchive -o ./sink -f "cloudaudit.googleapis.com/activity/2019/07/22/*"
//! gcp-log merge -f "./sink/*.json" -r -o day.json
//!
//! # What happened, who did it
//! gcp-log statistics -f day.json
//!
//! # Zoom in on one hour around an incident, then on one account
//! gcp-log timeslice "2019-07-22 20:04:31" -s 60 -f day.json -o hour.json
//! gcp-log filter include -f hour.json -o ops.json \
//!     -t "protoPayload.authenticationInfo.principalEmail=ops@example.com"
//! ```
//!
//! ## Installation
//!
//! ```bash
//! cargo install --path .
//! ```

pub mod audit;
pub mod commands;
pub mod error;
pub mod utils;
