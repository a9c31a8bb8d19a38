//! Decoded log records.
//!
//! Cloud audit events vary in shape by service and method, so a record is
//! kept as a dynamic JSON tree rather than a fixed struct. The only
//! guarantee is that the top-level value is an object.
//!
//! # Examples
//!
//! ```
//! use gcp_log_tools::audit::path::FieldPath;
//! use gcp_log_tools::audit::record::Record;
//!
//! let record = Record::decode(r#"{"severity":"NOTICE","resource":{"type":"gce_instance"}}"#).unwrap();
//! let path = FieldPath::parse("resource.type").unwrap();
//! assert_eq!(record.lookup_text(&path).as_deref(), Some("gce_instance"));
//! ```

use crate::audit::path::FieldPath;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};

/// One decoded audit log event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Decode a single-line JSON object.
    ///
    /// Fails for malformed JSON and for well-formed values that are not
    /// objects (arrays, strings, numbers).
    pub fn decode(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line).context("Failed to decode JSON record")?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(anyhow!(
                "Expected a JSON object, found {}",
                value_kind(&other)
            )),
        }
    }

    /// Resolve a field path by descending one mapping per segment.
    ///
    /// Returns `None` when any segment is missing or an intermediate value
    /// is not an object. A field present with a JSON `null` resolves to
    /// `Some(&Value::Null)`.
    pub fn lookup(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.fields.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Resolve a field path and render it as comparison text.
    pub fn lookup_text(&self, path: &FieldPath) -> Option<String> {
        self.lookup(path).map(value_as_text)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `insertId` field, used to identify a record in diagnostics.
    pub fn insert_id(&self) -> Option<&str> {
        self.fields.get("insertId").and_then(Value::as_str)
    }

    /// The raw `timestamp` field.
    pub fn timestamp_text(&self) -> Option<&str> {
        self.fields.get("timestamp").and_then(Value::as_str)
    }

    /// The record timestamp, second resolution.
    ///
    /// `None` when the field is absent, not a string, or unparseable.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp_text()
            .and_then(|ts| crate::utils::time::parse_record_timestamp(ts).ok())
    }

    /// Serialize back to a single line of JSON (no trailing newline).
    pub fn to_line(&self) -> Result<String> {
        serde_json::to_string(&self.fields).context("Failed to encode record")
    }
}

/// String form of a JSON value for equality checks against user input.
///
/// Strings compare by content (no quotes); numbers and booleans use their
/// JSON spelling; `null` becomes `"null"`; objects and arrays use compact
/// JSON.
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> FieldPath {
        FieldPath::parse(raw).unwrap()
    }

    const SAMPLE: &str = r#"{"insertId":"abc123","timestamp":"2019-07-22T20:04:31.212077Z","severity":"NOTICE","resource":{"type":"gce_instance","labels":{"zone":"us-east1-b"}},"protoPayload":{"authenticationInfo":{"principalEmail":"test@testdomain.com"},"status":{"code":7,"details":null},"request":{"a":{"b":{"c":true}}}}}"#;

    #[test]
    fn test_decode_object() {
        let record = Record::decode(SAMPLE).unwrap();
        assert_eq!(record.insert_id(), Some("abc123"));
        assert_eq!(record.get("severity"), Some(&Value::from("NOTICE")));
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(Record::decode("[1,2,3]").is_err());
        assert!(Record::decode("\"text\"").is_err());
        assert!(Record::decode("{\"unterminated\":").is_err());
    }

    #[test]
    fn test_lookup_depths() {
        let record = Record::decode(SAMPLE).unwrap();
        assert_eq!(
            record.lookup_text(&path("severity")).as_deref(),
            Some("NOTICE")
        );
        assert_eq!(
            record.lookup_text(&path("resource.type")).as_deref(),
            Some("gce_instance")
        );
        assert_eq!(
            record
                .lookup_text(&path("protoPayload.authenticationInfo.principalEmail"))
                .as_deref(),
            Some("test@testdomain.com")
        );
        assert_eq!(
            record
                .lookup_text(&path("protoPayload.request.a.b.c"))
                .as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_lookup_missing_vs_null() {
        let record = Record::decode(SAMPLE).unwrap();
        assert_eq!(record.lookup(&path("protoPayload.status.missing")), None);
        assert_eq!(
            record.lookup(&path("protoPayload.status.details")),
            Some(&Value::Null)
        );
    }

    #[test]
    fn test_lookup_through_scalar_fails() {
        let record = Record::decode(SAMPLE).unwrap();
        assert_eq!(record.lookup(&path("severity.level")), None);
        assert_eq!(record.lookup(&path("protoPayload.status.code.value")), None);
    }

    #[test]
    fn test_value_as_text() {
        assert_eq!(value_as_text(&Value::from(7)), "7");
        assert_eq!(value_as_text(&Value::from(true)), "true");
        assert_eq!(value_as_text(&Value::Null), "null");
        assert_eq!(value_as_text(&Value::from("x")), "x");
    }

    #[test]
    fn test_timestamp_parsing() {
        let record = Record::decode(SAMPLE).unwrap();
        let ts = record.timestamp().unwrap();
        assert_eq!(ts.to_string(), "2019-07-22 20:04:31");

        let bad = Record::decode(r#"{"timestamp":"yesterday"}"#).unwrap();
        assert_eq!(bad.timestamp(), None);

        let missing = Record::decode(r#"{"severity":"INFO"}"#).unwrap();
        assert_eq!(missing.timestamp(), None);
    }

    #[test]
    fn test_to_line_is_single_line() {
        let record = Record::decode("{\n  \"a\": {\n    \"b\": 1\n  }\n}").unwrap();
        assert_eq!(record.to_line().unwrap(), r#"{"a":{"b":1}}"#);
    }
}
