//! REST CMS client (WordPress-compatible API shape). Null-safe by contract:
//! missing credentials or per-call failures surface as `Ok(None)`, never as
//! run-fatal errors.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use pressroom_pipeline::traits::CmsClient;

pub struct RestCms {
    credentials: Option<Credentials>,
    http: reqwest::Client,
}

struct Credentials {
    base_url: String,
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct IdResponse {
    id: u64,
}

impl RestCms {
    pub fn new(
        base_url: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        let credentials = match (base_url, username, password) {
            (Some(base_url), Some(username), Some(password)) => Some(Credentials {
                base_url,
                username,
                password,
            }),
            _ => None,
        };
        Self {
            credentials,
            http: reqwest::Client::new(),
        }
    }

    async fn try_upload_media(&self, creds: &Credentials, image_url: &str) -> Result<u64> {
        // Pull the bytes, then push them into the media library.
        let image = self.http.get(image_url).send().await?;
        if !image.status().is_success() {
            anyhow::bail!("image fetch returned {}", image.status());
        }
        let bytes = image.bytes().await?;

        let resp = self
            .http
            .post(format!("{}/wp-json/wp/v2/media", creds.base_url))
            .basic_auth(&creds.username, Some(&creds.password))
            .header("content-type", "image/png")
            .header(
                "content-disposition",
                "attachment; filename=\"article-image.png\"",
            )
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("media upload returned {status}: {body}");
        }
        let media: IdResponse = resp.json().await?;
        Ok(media.id)
    }

    async fn try_create_post(
        &self,
        creds: &Credentials,
        title: &str,
        content: &str,
        featured_media: Option<u64>,
    ) -> Result<u64> {
        let mut payload = json!({
            "title": title,
            "content": content,
            "status": "publish",
        });
        if let Some(media_id) = featured_media {
            payload["featured_media"] = json!(media_id);
        }

        let resp = self
            .http
            .post(format!("{}/wp-json/wp/v2/posts", creds.base_url))
            .basic_auth(&creds.username, Some(&creds.password))
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("post creation returned {status}: {body}");
        }
        let post: IdResponse = resp.json().await?;
        Ok(post.id)
    }
}

#[async_trait]
impl CmsClient for RestCms {
    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn upload_media(&self, image_url: &str) -> Result<Option<u64>> {
        let Some(creds) = &self.credentials else {
            return Ok(None);
        };
        match self.try_upload_media(creds, image_url).await {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!(image_url, error = %e, "CMS media upload failed");
                Ok(None)
            }
        }
    }

    async fn create_post(
        &self,
        title: &str,
        content: &str,
        featured_media: Option<u64>,
    ) -> Result<Option<u64>> {
        let Some(creds) = &self.credentials else {
            return Ok(None);
        };
        match self
            .try_create_post(creds, title, content, featured_media)
            .await
        {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!(title, error = %e, "CMS post creation failed");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_credentials_mean_unconfigured() {
        let cms = RestCms::new(Some("https://cms.test".into()), Some("user".into()), None);
        assert!(!cms.is_configured());
        let cms = RestCms::new(
            Some("https://cms.test".into()),
            Some("user".into()),
            Some("pass".into()),
        );
        assert!(cms.is_configured());
    }

    #[tokio::test]
    async fn unconfigured_calls_are_null_safe() {
        let cms = RestCms::new(None, None, None);
        assert_eq!(cms.upload_media("https://x/i.png").await.unwrap(), None);
        assert_eq!(cms.create_post("t", "c", None).await.unwrap(), None);
    }
}
