//! Object storage backends for generated images.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use pressroom_pipeline::traits::ObjectStore;

/// REST object storage: PUT the bytes, serve them from the public URL.
pub struct HttpObjectStore {
    base_url: String,
    bucket: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl HttpObjectStore {
    pub fn new(base_url: String, bucket: String, token: Option<String>) -> Self {
        Self {
            base_url,
            bucket,
            token,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> Result<String> {
        let url = format!("{}/{}/{path}", self.base_url, self.bucket);
        let mut req = self
            .http
            .put(&url)
            .header("content-type", content_type)
            .body(bytes);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("object store returned {status}: {body}");
        }
        Ok(url)
    }

    fn make_filename(&self, prefix: &str, extension: &str) -> String {
        format!("{prefix}/{}.{extension}", Uuid::new_v4())
    }
}

/// Local-disk fallback used when no object storage is configured. URLs are
/// `file://` paths, fine for development and tests.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, bytes: Vec<u8>, path: &str, _content_type: &str) -> Result<String> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full, bytes)
            .await
            .with_context(|| format!("writing {}", full.display()))?;
        Ok(format!("file://{}", full.display()))
    }

    fn make_filename(&self, prefix: &str, extension: &str) -> String {
        format!("{prefix}/{}.{extension}", Uuid::new_v4())
    }
}
