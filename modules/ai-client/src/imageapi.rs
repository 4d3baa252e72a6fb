use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::traits::ImageSynth;

/// Generic image-generation REST backend. One handle per model id; the
/// service renders the image and returns a hosted URL.
pub struct ImageApi {
    base_url: String,
    api_key: String,
    model: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ImageResponse {
    url: String,
}

impl ImageApi {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageSynth for ImageApi {
    async fn synthesize(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/images/generate", self.base_url);

        debug!(model = %self.model, "Image generation request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "prompt": prompt }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Image API error ({}): {}", status, error_text));
        }

        let parsed: ImageResponse = response.json().await?;
        Ok(parsed.url)
    }
}
