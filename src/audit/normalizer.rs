//! Streaming conversion of pretty-printed JSON arrays to one record per line.
//!
//! `gcloud logging read --format=json` prints an array of objects with a
//! fixed two-space indent:
//!
//! ```text
//! [
//!   {
//!     "insertId": "abc",
//!     "severity": "NOTICE"
//!   },
//!   {
//!     "insertId": "def"
//!   }
//! ]
//! ```
//!
//! Rather than parsing the whole array, each line is classified by its
//! prefix and fed through a two-state machine (outside an element / inside
//! an element). Only the element currently being assembled is held in
//! memory, so multi-gigabyte exports stream in constant space.
//!
//! The contract is the pretty-printer's layout, not JSON in general. An
//! element that is opened but never closed is dropped with a warning.

use anyhow::{Context, Result};
use std::io::{BufRead, Lines};
use tracing::{debug, info, warn};

/// Records between "Processed logs" progress messages.
pub const PROGRESS_INTERVAL: usize = 10_000;

const OBJECT_OPEN: &str = "  {";
const OBJECT_CLOSE: &str = "  }";

/// Prefix class of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// `[` opening the array.
    ArrayOpen,
    /// `]` closing the array; ends the stream.
    ArrayClose,
    /// `  {` starting an element.
    ObjectOpen,
    /// `  },` closing an element that has a successor.
    ObjectCloseComma,
    /// `  }` closing the last element.
    ObjectCloseFinal,
    /// Any other content line.
    Interior,
    /// Empty or whitespace-only.
    Blank,
}

impl LineClass {
    /// Classify `line` (without its line terminator).
    ///
    /// Array markers are only recognised between elements, so nested arrays
    /// inside an element are never mistaken for the outer brackets.
    pub fn classify(line: &str, in_object: bool) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Blank;
        }
        if line.starts_with(OBJECT_CLOSE) {
            return if trimmed.ends_with(',') {
                Self::ObjectCloseComma
            } else {
                Self::ObjectCloseFinal
            };
        }
        if line.starts_with(OBJECT_OPEN) {
            return Self::ObjectOpen;
        }
        if !in_object {
            if trimmed.starts_with('[') {
                return Self::ArrayOpen;
            }
            if trimmed.starts_with(']') {
                return Self::ArrayClose;
            }
        }
        Self::Interior
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InObject,
    Finished,
}

/// Lazy iterator of single-line JSON records read from a pretty-printed array.
pub struct Normalizer<R> {
    lines: Lines<R>,
    state: State,
    buffer: String,
    line_number: usize,
    emitted: usize,
    dropped: usize,
}

impl<R: BufRead> Normalizer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            state: State::Outside,
            buffer: String::new(),
            line_number: 0,
            emitted: 0,
            dropped: 0,
        }
    }

    /// Records emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Unterminated elements discarded so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Input lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    fn drop_partial(&mut self, reason: &str) {
        if !self.buffer.is_empty() {
            warn!(
                "Dropping unterminated record at line {} ({}): {} bytes discarded",
                self.line_number,
                reason,
                self.buffer.len()
            );
            self.dropped += 1;
            self.buffer.clear();
        }
    }

    fn emit(&mut self) -> String {
        self.emitted += 1;
        if self.emitted % PROGRESS_INTERVAL == 0 {
            info!("Processed logs: {}", self.emitted);
        }
        self.state = State::Outside;
        std::mem::take(&mut self.buffer)
    }
}

impl<R: BufRead> Iterator for Normalizer<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.state != State::Finished {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.state = State::Finished;
                    return Some(Err(e).with_context(|| {
                        format!("Failed to read line {}", self.line_number + 1)
                    }));
                }
                None => {
                    self.drop_partial("end of input");
                    self.state = State::Finished;
                    break;
                }
            };
            self.line_number += 1;
            let line = line.trim_end_matches('\r');

            match LineClass::classify(line, self.state == State::InObject) {
                LineClass::Blank | LineClass::ArrayOpen => {}
                LineClass::ArrayClose => {
                    debug!("Array closed at line {}", self.line_number);
                    self.state = State::Finished;
                }
                LineClass::ObjectOpen => {
                    if self.state == State::InObject {
                        self.drop_partial("new element opened before close");
                    }
                    self.buffer.push_str(line.trim());
                    self.state = State::InObject;
                }
                LineClass::ObjectCloseComma => {
                    if self.state != State::InObject {
                        warn!("Unexpected element close at line {}", self.line_number);
                        continue;
                    }
                    self.buffer.push_str(line.trim().trim_end_matches(',').trim_end());
                    return Some(Ok(self.emit()));
                }
                LineClass::ObjectCloseFinal => {
                    if self.state != State::InObject {
                        warn!("Unexpected element close at line {}", self.line_number);
                        continue;
                    }
                    self.buffer.push_str(line.trim());
                    return Some(Ok(self.emit()));
                }
                LineClass::Interior => {
                    if self.state == State::InObject {
                        self.buffer.push_str(line.trim());
                    } else {
                        debug!(
                            "Ignoring content outside any element at line {}",
                            self.line_number
                        );
                    }
                }
            }
        }
        None
    }
}
