mod client;
mod types;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::TextModel;
use client::GeminiClient;
use types::{Content, GenerateRequest, GenerationConfig, Part};

const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Text-generation handle bound to one model id.
pub struct Gemini {
    client: GeminiClient,
    model: String,
}

impl Gemini {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: GeminiClient::new(api_key),
            model: model.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }
}

#[async_trait]
impl TextModel for Gemini {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                candidate_count: 1,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                temperature,
            },
        };

        let response = self.client.generate(&self.model, &request).await?;
        response
            .text()
            .ok_or_else(|| anyhow!("Gemini returned no candidates for model {}", self.model))
    }
}
