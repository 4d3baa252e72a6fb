//! Headless-store client (Supabase-compatible API shape): storage uploads
//! plus a REST table insert for the published article row.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use pressroom_pipeline::traits::{HeadlessStore, StoreArticle};

pub struct HeadlessClient {
    base_url: String,
    api_key: String,
    bucket: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct InsertedRow {
    id: String,
}

impl HeadlessClient {
    pub fn new(base_url: String, api_key: String, bucket: String) -> Self {
        Self {
            base_url,
            api_key,
            bucket,
            http: reqwest::Client::new(),
        }
    }

    fn public_url(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{filename}",
            self.base_url, self.bucket
        )
    }

    async fn try_upload(&self, image_url: &str, filename: &str) -> Result<String> {
        let image = self.http.get(image_url).send().await?;
        if !image.status().is_success() {
            anyhow::bail!("image fetch returned {}", image.status());
        }
        let bytes = image.bytes().await?;

        let resp = self
            .http
            .post(format!(
                "{}/storage/v1/object/{}/{filename}",
                self.base_url, self.bucket
            ))
            .bearer_auth(&self.api_key)
            .header("content-type", "image/png")
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("storage upload returned {status}: {body}");
        }
        Ok(self.public_url(filename))
    }
}

#[async_trait]
impl HeadlessStore for HeadlessClient {
    async fn upload_image(&self, image_url: &str, filename: &str) -> Result<Option<String>> {
        match self.try_upload(image_url, filename).await {
            Ok(url) => Ok(Some(url)),
            Err(e) => {
                warn!(image_url, filename, error = %e, "Store image upload failed");
                Ok(None)
            }
        }
    }

    async fn insert_article(&self, article: &StoreArticle) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/rest/v1/articles", self.base_url))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("prefer", "return=representation")
            .json(article)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("article insert returned {status}: {body}");
        }

        // PostgREST returns the inserted rows as an array.
        let rows: Vec<InsertedRow> = resp.json().await?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| anyhow::anyhow!("article insert returned no rows"))
    }
}
