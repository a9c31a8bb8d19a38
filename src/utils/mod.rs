//! Utility functions and helpers.
//!
//! This module provides common functionality used across multiple commands:
//!
//! - [`context`] - Per-run settings, confirmation prompts and logging setup
//! - [`processor`] - Line-by-line record processing over many files
//! - [`parallel`] - Multi-file processing on all cores
//! - [`reader`] - File reader with automatic decompression
//! - [`sink`] - Append-only output for records and raw bytes
//! - [`listing`] - Wildcard file listing, optionally recursive
//! - [`gcs`] - Cloud Storage listing and download
//! - [`time`] - Timestamp parsing and formatting helpers
//! - [`progress`] - Progress display
//! - [`format`] - Number and size formatting
//!
//! # Examples
//!
//! ## Parsing an operator time
//!
//! ```no_run
//! use gcp_log_tools::utils::time::parse_operator_time;
//!
//! let t = parse_operator_time("2019-07-22 20:04:31").unwrap();
//! println!("Parsed: {}", t);
//! ```
//!
//! ## Reading compressed files
//!
//! ```no_run
//! use gcp_log_tools::utils::reader::open_lines;
//! use std::io::BufRead;
//!
//! // Automatically decompresses .gz and .zst files
//! for line in open_lines("activity.json.gz").unwrap().lines() {
//!     println!("{}", line.unwrap());
//! }
//! ```

pub mod context;
pub mod format;
pub mod gcs;
pub mod listing;
pub mod parallel;
pub mod processor;
pub mod progress;
pub mod reader;
pub mod sink;
pub mod time;
