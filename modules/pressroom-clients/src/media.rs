use anyhow::Result;
use async_trait::async_trait;

use pressroom_pipeline::traits::MediaFetcher;

/// Plain HTTP byte fetcher for generated-image URLs.
pub struct HttpMediaFetcher {
    http: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("media fetch returned {}", resp.status());
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
