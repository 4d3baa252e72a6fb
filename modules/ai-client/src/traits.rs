use anyhow::Result;
use async_trait::async_trait;

/// A generative text model. Backend failures (network, quota, HTTP errors)
/// surface as `Err` — callers decide whether to propagate or substitute.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;
}

/// A generative image model. Returns a remote URL for the rendered image.
#[async_trait]
pub trait ImageSynth: Send + Sync {
    async fn synthesize(&self, prompt: &str) -> Result<String>;
}
