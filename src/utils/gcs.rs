//! Minimal Cloud Storage JSON API client.
//!
//! Log sinks export audit logs to a bucket as one object per hour. This
//! client lists a bucket's objects and downloads them, which is all the
//! `download` command needs.
//!
//! Authentication is a bearer token (`gcloud auth print-access-token`),
//! taken from `--token` or `GOOGLE_OAUTH_ACCESS_TOKEN`. Without one,
//! requests are anonymous and only public buckets are readable.
//! `GCS_ENDPOINT` points the client at an emulator.

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// One object in a bucket listing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ObjectInfo {
    pub name: String,
    /// The API reports sizes as decimal strings.
    #[serde(default, deserialize_with = "size_from_string")]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectInfo>,
    next_page_token: Option<String>,
}

fn size_from_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Result of a single object download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    Saved { path: PathBuf, bytes: u64 },
    NotFound,
}

#[derive(Debug, Clone)]
pub struct StorageClient {
    endpoint: Url,
    token: Option<String>,
    client: Client,
}

impl StorageClient {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .with_context(|| format!("Invalid storage endpoint: {}", endpoint))?;
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint,
            token,
            client,
        })
    }

    /// Client from CLI options, falling back to the environment.
    pub fn from_options(token: Option<&str>) -> Result<Self> {
        let endpoint =
            env::var("GCS_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let token = token
            .map(str::to_string)
            .or_else(|| env::var("GOOGLE_OAUTH_ACCESS_TOKEN").ok())
            .filter(|t| !t.trim().is_empty());

        Self::new(&endpoint, token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str().trim_end_matches('/')
    }

    /// URL of the object collection of `bucket`.
    pub fn objects_url(&self, bucket: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Storage endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", bucket, "o"]);
        Ok(url)
    }

    /// Media download URL of one object; the name is percent-encoded.
    pub fn media_url(&self, bucket: &str, name: &str) -> Result<Url> {
        let mut url = self.objects_url(bucket)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Storage endpoint cannot be a base URL"))?
            .push(name);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// List every object in `bucket`, following pagination.
    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.objects_url(bucket)?;
            url.query_pairs_mut()
                .append_pair("fields", "items(name,size),nextPageToken");
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let response = self
                .get(url)
                .send()
                .await
                .context("Failed to send request to Cloud Storage")?;
            let status = response.status();
            let body = response
                .text()
                .await
                .context("Failed to read response body")?;

            if !status.is_success() {
                return Err(anyhow!(
                    "Cloud Storage listing of '{}' failed with status {}: {}",
                    bucket,
                    status,
                    body
                ));
            }

            let page: ObjectList = serde_json::from_str(&body)
                .with_context(|| format!("Failed to parse object listing for {}", bucket))?;
            objects.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(objects)
    }

    /// Download one object to `destination`, creating parent directories.
    pub async fn download(&self, bucket: &str, name: &str, destination: &Path) -> Result<Download> {
        let response = self
            .get(self.media_url(bucket, name)?)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", name))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Download::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Download of {} failed with status {}: {}",
                name,
                status,
                body
            ));
        }

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = std::fs::File::create(destination)
            .with_context(|| format!("Failed to create {}", destination.display()))?;

        let mut response = response;
        let mut bytes = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed to download {}", name))?
        {
            file.write_all(&chunk)
                .with_context(|| format!("Failed to write {}", destination.display()))?;
            bytes += chunk.len() as u64;
        }

        Ok(Download::Saved {
            path: destination.to_path_buf(),
            bytes,
        })
    }
}

/// Local path for an object: `:` (invalid on some file systems) becomes `-`.
pub fn local_path(output_dir: &Path, object_name: &str) -> PathBuf {
    output_dir.join(object_name.replace(':', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = StorageClient::new("http://127.0.0.1:4443/", None).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:4443");
        assert!(!client.is_authenticated());

        assert!(StorageClient::new("not a url", None).is_err());
    }

    #[test]
    fn test_objects_url() {
        let client = StorageClient::new(DEFAULT_ENDPOINT, Some("t".into())).unwrap();
        let url = client.objects_url("myproject-logarchive").unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/myproject-logarchive/o"
        );
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_media_url_encodes_name() {
        let client = StorageClient::new(DEFAULT_ENDPOINT, None).unwrap();
        let url = client
            .media_url(
                "archive",
                "cloudaudit.googleapis.com/activity/2019/06/16/08:00:00_08:59:59_S0.json",
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/archive/o/\
             cloudaudit.googleapis.com%2Factivity%2F2019%2F06%2F16%2F08:00:00_08:59:59_S0.json?alt=media"
        );
    }

    #[test]
    fn test_parse_listing() {
        let body = r#"{"items":[{"name":"a/1.json","size":"1024"},{"name":"a/2.json","size":"0"}],"nextPageToken":"abc"}"#;
        let page: ObjectList = serde_json::from_str(body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].size, 1024);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));

        let empty: ObjectList = serde_json::from_str("{}").unwrap();
        assert!(empty.items.is_empty());
        assert!(empty.next_page_token.is_none());
    }

    #[test]
    fn test_local_path() {
        let path = local_path(
            Path::new("download"),
            "cloudaudit.googleapis.com/activity/2019/06/16/08:00:00_08:59:59_S0.json",
        );
        assert_eq!(
            path,
            Path::new("download/cloudaudit.googleapis.com/activity/2019/06/16/08-00-00_08-59-59_S0.json")
        );
    }
}
