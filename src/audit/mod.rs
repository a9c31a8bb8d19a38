//! Audit log records and the operations defined over them.
//!
//! - [`record`] - A decoded log entry and nested field lookup
//! - [`path`] - Dotted field paths (`protoPayload.authenticationInfo.principalEmail`)
//! - [`filter`] - Include/exclude conditions on field values
//! - [`window`] - Inclusive time windows for slicing logs
//! - [`normalizer`] - Pretty-printed JSON array to one record per line

pub mod filter;
pub mod normalizer;
pub mod path;
pub mod record;
pub mod window;
