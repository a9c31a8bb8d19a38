//! File listing for multi-file operations.
//!
//! A pattern is a directory plus a file-name wildcard, e.g.
//! `./sink/cloudaudit.googleapis.com/activity/*.json`. Only the final
//! component may contain wildcards (`*` any run of characters, `?` one
//! character). With `recurse` every directory below the base directory is
//! searched too.
//!
//! Results are sorted so merges are reproducible regardless of the order
//! the file system enumerates entries in.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Expand `pattern` into a sorted list of regular files.
pub fn list_files(pattern: &str, recurse: bool) -> Result<Vec<PathBuf>> {
    debug!("getting file listing for {} (recurse == {})", pattern, recurse);

    let pattern = expand_home(pattern);
    let (dir, name) = split_pattern(&pattern);
    let matcher = wildcard_regex(&name)?;

    let mut files = Vec::new();
    if dir.is_dir() {
        collect(&dir, &matcher, recurse, &mut files)?;
    }
    files.sort();

    Ok(files)
}

/// Compile a file-name wildcard into an anchored regex.
pub fn wildcard_regex(wildcard: &str) -> Result<Regex> {
    let mut expr = String::with_capacity(wildcard.len() + 8);
    expr.push('^');
    for c in wildcard.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');

    Regex::new(&expr).with_context(|| format!("Invalid file pattern: {}", wildcard))
}

fn collect(dir: &Path, matcher: &Regex, recurse: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let path = entry.path();

        if path.is_dir() {
            if recurse {
                collect(&path, matcher, recurse, files)?;
            }
            continue;
        }

        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| matcher.is_match(n));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    Ok(())
}

fn split_pattern(pattern: &Path) -> (PathBuf, String) {
    let name = pattern
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "*".to_string());
    let dir = match pattern.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (dir, name)
}

fn expand_home(pattern: &str) -> PathBuf {
    if let Some(rest) = pattern.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(pattern)
}
