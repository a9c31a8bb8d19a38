//! Download exported log objects from a Cloud Storage bucket.
//!
//! # Usage
//!
//! ```bash
//! export GOOGLE_OAUTH_ACCESS_TOKEN=$(gcloud auth print-access-token)
//!
//! # Every object in the bucket
//! gcp-log download -b myproject-logarchive -o ./download
//!
//! # Only one day of activity logs
//! gcp-log download -b myproject-logarchive -o ./download \
//!     -f "cloudaudit.googleapis.com/activity/2019/07/22/*"
//! ```
//!
//! Object names keep their directory structure under the output directory,
//! with `:` replaced by `-`. Objects that disappear between listing and
//! download are reported and skipped.

use crate::error::ToolboxError;
use crate::utils::context::RunContext;
use crate::utils::format::{format_bytes, format_number};
use crate::utils::gcs::{local_path, Download, ObjectInfo, StorageClient};
use crate::utils::listing::wildcard_regex;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of a bucket download.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub identified: usize,
    pub downloaded: usize,
    pub missing: usize,
    pub bytes: u64,
}

/// Objects whose full name matches the wildcard `filter`, in listing order.
pub fn select_objects(objects: Vec<ObjectInfo>, filter: Option<&str>) -> Result<Vec<ObjectInfo>> {
    let Some(filter) = filter else {
        return Ok(objects);
    };
    let matcher = wildcard_regex(filter)?;
    Ok(objects
        .into_iter()
        .filter(|object| matcher.is_match(&object.name))
        .collect())
}

pub async fn run(
    ctx: &mut RunContext,
    bucket: &str,
    filter: Option<&str>,
    output_dir: &str,
    token: Option<&str>,
) -> Result<DownloadSummary> {
    let client = StorageClient::from_options(token)?;
    if !client.is_authenticated() {
        warn!("No access token provided, requests are anonymous");
    }
    debug!("using storage endpoint {}", client.endpoint());

    info!("Listing objects in gs://{}", bucket);
    let objects = select_objects(client.list_objects(bucket).await?, filter)?;
    if objects.is_empty() {
        return Err(ToolboxError::NoObjectsIdentified(bucket.to_string()).into());
    }

    let total: u64 = objects.iter().map(|object| object.size).sum();
    info!("Identified objects: {}", format_number(objects.len()));
    info!("Download size: {}", format_bytes(total));
    ctx.confirm_or_abort()?;

    download_objects(ctx, &client, bucket, &objects, Path::new(output_dir)).await
}

/// Download `objects` one after another into `output_dir`.
pub async fn download_objects(
    ctx: &RunContext,
    client: &StorageClient,
    bucket: &str,
    objects: &[ObjectInfo],
    output_dir: &Path,
) -> Result<DownloadSummary> {
    let total: u64 = objects.iter().map(|object| object.size).sum();
    let progress = ctx.progress(Some(total), "Downloading");
    let mut summary = DownloadSummary {
        identified: objects.len(),
        ..DownloadSummary::default()
    };

    for object in objects {
        let destination = local_path(output_dir, &object.name);
        match client.download(bucket, &object.name, &destination).await? {
            Download::Saved { path, bytes } => {
                info!("Downloaded {} to {}", object.name, path.display());
                summary.downloaded += 1;
                summary.bytes += bytes;
            }
            Download::NotFound => {
                warn!("Object not found, skipping: {}", object.name);
                summary.missing += 1;
            }
        }
        progress.inc(object.size);
    }
    progress.finish();

    eprintln!(
        "Downloaded {} of {} objects ({})",
        format_number(summary.downloaded),
        format_number(summary.identified),
        format_bytes(summary.bytes)
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str, size: u64) -> ObjectInfo {
        ObjectInfo {
            name: name.to_string(),
            size,
        }
    }

    #[test]
    fn test_select_all_without_filter() {
        let objects = vec![object("a.json", 1), object("b.json", 2)];
        assert_eq!(select_objects(objects.clone(), None).unwrap(), objects);
    }

    #[test]
    fn test_select_by_wildcard() {
        let objects = vec![
            object("cloudaudit.googleapis.com/activity/2019/07/22/20:00:00_20:59:59_S0.json", 10),
            object("cloudaudit.googleapis.com/activity/2019/07/23/00:00:00_00:59:59_S0.json", 20),
            object("cloudaudit.googleapis.com/data_access/2019/07/22/20:00:00_20:59:59_S0.json", 30),
        ];
        let selected =
            select_objects(objects, Some("cloudaudit.googleapis.com/activity/2019/07/22/*"))
                .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].size, 10);
    }

    #[test]
    fn test_select_no_match() {
        let objects = vec![object("a.json", 1)];
        assert!(select_objects(objects, Some("*.csv")).unwrap().is_empty());
    }
}
