//! Append-only output destination.
//!
//! The destination is opened once per run in append mode, so rerunning a
//! command adds to an existing file instead of truncating it. Records are
//! written as compact single-line JSON followed by `\n`.

use crate::audit::record::Record;
use crate::error::ToolboxError;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Sink {
    target: PathBuf,
    writer: BufWriter<Box<dyn Write + Send>>,
    records: usize,
    bytes: u64,
}

impl Sink {
    /// Open `path` for appending, creating it if needed. `-` is stdout.
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inner: Box<dyn Write + Send> = if path == Path::new("-") {
            Box::new(std::io::stdout())
        } else {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open output file: {}", path.display()))?;
            Box::new(file)
        };
        debug!("writing output to: {}", path.display());

        Ok(Self {
            target: path.to_path_buf(),
            writer: BufWriter::new(inner),
            records: 0,
            bytes: 0,
        })
    }

    /// Append a record as one line of JSON and flush it.
    ///
    /// Each record reaches the destination before the next one is written,
    /// so a failure names the record's `insertId` when it has one.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let line = record.to_line()?;
        self.write_line(&line)
            .and_then(|()| self.flush())
            .map_err(|e| {
            let target = match record.insert_id() {
                Some(id) => format!("log {}", id),
                None => format!("output {}", self.target.display()),
            };
                e.context(ToolboxError::WriteFailed { target })
            })?;
        self.records += 1;
        Ok(())
    }

    /// Append an already-encoded single-line record plus `\n`.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.write_raw(line)?;
        self.write_raw("\n")
    }

    /// Append text verbatim.
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .with_context(|| ToolboxError::WriteFailed {
                target: format!("output {}", self.target.display()),
            })?;
        self.bytes += text.len() as u64;
        Ok(())
    }

    /// Copy a whole byte stream verbatim, returning the bytes copied.
    pub fn copy_from(&mut self, reader: &mut dyn Read) -> Result<u64> {
        let copied = std::io::copy(reader, &mut self.writer).with_context(|| {
            ToolboxError::WriteFailed {
                target: format!("output {}", self.target.display()),
            }
        })?;
        self.bytes += copied;
        Ok(copied)
    }

    /// Records written through [`Sink::write_record`] or counted by the caller.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Count a record written via [`Sink::write_line`].
    pub fn count_record(&mut self) {
        self.records += 1;
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().with_context(|| ToolboxError::WriteFailed {
            target: format!("output {}", self.target.display()),
        })
    }

    /// Flush buffered output. Dropping without calling this may lose data.
    pub fn finish(mut self) -> Result<()> {
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_records_and_append() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.json");

        let record = Record::decode(r#"{"insertId":"a","severity":"NOTICE"}"#).unwrap();
        let mut sink = Sink::append(&out).unwrap();
        sink.write_record(&record).unwrap();
        assert_eq!(sink.records(), 1);
        sink.finish().unwrap();

        let mut sink = Sink::append(&out).unwrap();
        sink.write_raw("raw text").unwrap();
        sink.finish().unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            content,
            "{\"insertId\":\"a\",\"severity\":\"NOTICE\"}\nraw text"
        );
    }

    #[test]
    fn test_copy_from() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.json");

        let mut sink = Sink::append(&out).unwrap();
        let copied = sink.copy_from(&mut "line 1\nline 2\n".as_bytes()).unwrap();
        assert_eq!(copied, 14);
        assert_eq!(sink.bytes(), 14);
        sink.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "line 1\nline 2\n");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_failure_names_record() {
        let record =
            Record::decode(r#"{"insertId":"abc123","severity":"NOTICE"}"#).unwrap();
        let mut sink = Sink::append("/dev/full").unwrap();

        let err = sink.write_record(&record).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolboxError>(),
            Some(ToolboxError::WriteFailed { target }) if target == "log abc123"
        ));
        assert!(format!("{:#}", err).contains("abc123"));
        assert_eq!(sink.records(), 0);
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        let result = Sink::append(dir.path().join("missing").join("out.json"));
        assert!(result.is_err());
    }
}
