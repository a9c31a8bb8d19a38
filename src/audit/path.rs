//! Dotted field paths into nested log records.
//!
//! A path such as `protoPayload.authenticationInfo.principalEmail` names a
//! value three mappings deep. Paths are limited to [`MAX_PATH_DEPTH`]
//! segments; anything deeper is rejected when the path is parsed rather
//! than silently never matching.

use crate::error::{ToolboxError, MAX_PATH_DEPTH};
use std::fmt;

/// An ordered list of 1 to 6 key segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path, trimming whitespace around the whole path.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::EmptyPath`] for an empty path or an empty
    /// segment (`a..b`), and [`ToolboxError::PathTooDeep`] past six segments.
    pub fn parse(raw: &str) -> Result<Self, ToolboxError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ToolboxError::EmptyPath);
        }

        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ToolboxError::EmptyPath);
        }
        if segments.len() > MAX_PATH_DEPTH {
            return Err(ToolboxError::PathTooDeep {
                path: raw.to_string(),
                depth: segments.len(),
            });
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_segment() {
        let path = FieldPath::parse("severity").unwrap();
        assert_eq!(path.depth(), 1);
        assert_eq!(path.segments(), &["severity".to_string()]);
    }

    #[test]
    fn test_parse_nested_path() {
        let path = FieldPath::parse(" protoPayload.authenticationInfo.principalEmail ").unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(
            path.to_string(),
            "protoPayload.authenticationInfo.principalEmail"
        );
    }

    #[test]
    fn test_max_depth_accepted() {
        let path = FieldPath::parse("a.b.c.d.e.f").unwrap();
        assert_eq!(path.depth(), MAX_PATH_DEPTH);
    }

    #[test]
    fn test_too_deep_rejected() {
        let err = FieldPath::parse("a.b.c.d.e.f.g").unwrap_err();
        assert!(matches!(err, ToolboxError::PathTooDeep { depth: 7, .. }));
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!(matches!(
            FieldPath::parse(""),
            Err(ToolboxError::EmptyPath)
        ));
        assert!(matches!(
            FieldPath::parse("resource..type"),
            Err(ToolboxError::EmptyPath)
        ));
        assert!(matches!(
            FieldPath::parse("severity."),
            Err(ToolboxError::EmptyPath)
        ));
    }
}
