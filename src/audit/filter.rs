//! Field-path inclusion/exclusion filtering.
//!
//! Conditions come from a comma-separated `path=value` list, e.g.
//! `severity=NOTICE,protoPayload.authenticationInfo.principalEmail=a@b.com`.
//! Values are compared against the string form of the resolved field
//! (see [`value_as_text`](crate::audit::record::value_as_text)).
//!
//! # Modes
//!
//! - **Include**: every condition that matches forwards the record once, so
//!   a record matching two conditions is forwarded twice. Set
//!   [`FilterSet::unique`] to forward at most once.
//! - **Exclude**: a record is forwarded only when it mismatches *every*
//!   condition. A missing field counts as a mismatch.

use crate::audit::path::FieldPath;
use crate::audit::record::Record;
use crate::error::ToolboxError;
use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterMode {
    Include,
    Exclude,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => write!(f, "include"),
            Self::Exclude => write!(f, "exclude"),
        }
    }
}

/// A single `path=value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub path: FieldPath,
    pub expected: String,
}

impl FilterCondition {
    /// Parse `path=value`. Only the first `=` separates path from value.
    pub fn parse(raw: &str) -> Result<Self, ToolboxError> {
        let (path, expected) = raw
            .split_once('=')
            .ok_or_else(|| ToolboxError::InvalidCondition(raw.to_string()))?;

        Ok(Self {
            path: FieldPath::parse(path)?,
            expected: expected.trim().to_string(),
        })
    }

    /// `Some(true)` on match, `Some(false)` on mismatch, `None` when the
    /// path does not resolve.
    pub fn check(&self, record: &Record) -> Option<bool> {
        record
            .lookup_text(&self.path)
            .map(|actual| actual == self.expected)
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.path, self.expected)
    }
}

/// Parse a comma-separated condition list.
pub fn parse_conditions(spec: &str) -> Result<Vec<FilterCondition>, ToolboxError> {
    let conditions = spec
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(FilterCondition::parse)
        .collect::<Result<Vec<_>, _>>()?;

    if conditions.is_empty() {
        return Err(ToolboxError::InvalidCondition(spec.to_string()));
    }

    Ok(conditions)
}

/// The conditions and mode for one filtering run.
#[derive(Debug, Clone)]
pub struct FilterSet {
    mode: FilterMode,
    conditions: Vec<FilterCondition>,
    unique: bool,
}

impl FilterSet {
    pub fn new(mode: FilterMode, conditions: Vec<FilterCondition>) -> Self {
        Self {
            mode,
            conditions,
            unique: false,
        }
    }

    /// Parse a condition list for the given mode.
    pub fn parse(mode: FilterMode, spec: &str) -> Result<Self, ToolboxError> {
        Ok(Self::new(mode, parse_conditions(spec)?))
    }

    /// Forward each record at most once in include mode.
    #[must_use]
    pub const fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// How many times `record` should be written to the sink.
    pub fn evaluate(&self, record: &Record) -> usize {
        match self.mode {
            FilterMode::Include => {
                let matches = self
                    .conditions
                    .iter()
                    .filter(|c| c.check(record) == Some(true))
                    .count();
                if self.unique {
                    matches.min(1)
                } else {
                    matches
                }
            }
            FilterMode::Exclude => {
                let mismatches = self
                    .conditions
                    .iter()
                    .filter(|c| c.check(record) != Some(true))
                    .count();
                usize::from(mismatches == self.conditions.len())
            }
        }
    }
}
