//! Parallel file processing utilities.
//!
//! Read-only aggregations (statistics) fan out over input files with Rayon.
//! Results are collected in input order, so combining them is
//! deterministic even though files finish in any order.

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use tracing::info;

/// Result of processing a single file
#[derive(Debug)]
pub struct FileProcessResult<T> {
    pub file_path: String,
    pub data: T,
}

/// Process `files` concurrently and combine the per-file results.
///
/// `processor` runs once per file; `combiner` receives the results in the
/// same order as `files`. The first failing file aborts the run.
pub fn process_files_parallel<T, F, C, R>(files: &[String], processor: F, combiner: C) -> Result<R>
where
    T: Send,
    F: Fn(&str) -> Result<T> + Send + Sync,
    C: FnOnce(Vec<FileProcessResult<T>>) -> R,
{
    if files.is_empty() {
        return Err(anyhow!("No files provided for processing"));
    }

    if files.len() > 1 {
        info!("Processing {} files in parallel...", files.len());
    }

    let results: Vec<FileProcessResult<T>> = files
        .par_iter()
        .enumerate()
        .map(|(idx, file_path)| -> Result<FileProcessResult<T>> {
            let data = processor(file_path)
                .with_context(|| format!("Failed to process file: {}", file_path))?;

            if files.len() > 1 {
                info!(
                    "[{}/{}] Completed: {}",
                    idx + 1,
                    files.len(),
                    file_path.rsplit('/').next().unwrap_or(file_path)
                );
            }

            Ok(FileProcessResult {
                file_path: file_path.clone(),
                data,
            })
        })
        .collect::<Result<_>>()?;

    Ok(combiner(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::record::Record;
    use crate::utils::reader::open_lines;
    use std::io::{BufRead, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_parallel_processing_preserves_order() {
        let mut files = Vec::new();
        let _temp_files: Vec<NamedTempFile> = (0..4)
            .map(|i| {
                let mut temp_file = NamedTempFile::new().unwrap();
                for _ in 0..=i {
                    writeln!(temp_file, r#"{{"insertId":"{}","severity":"INFO"}}"#, i).unwrap();
                }
                files.push(temp_file.path().to_str().unwrap().to_string());
                temp_file
            })
            .collect();

        let counts = process_files_parallel(
            &files,
            |file_path| -> Result<usize> {
                let mut count = 0;
                for line in open_lines(file_path)?.lines() {
                    if Record::decode(&line?).is_ok() {
                        count += 1;
                    }
                }
                Ok(count)
            },
            |results| results.into_iter().map(|r| r.data).collect::<Vec<_>>(),
        )
        .unwrap();

        assert_eq!(counts, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_file_list() {
        let result = process_files_parallel(&[], |_| Ok(()), |_| ());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        let files = vec!["/nonexistent/a.json".to_string()];
        let result = process_files_parallel(&files, |f| open_lines(f).map(|_| ()), |_| ());
        assert!(result.is_err());
    }
}
