use std::sync::Arc;

use ai_client::ImageSynth;
use tracing::{error, info};

use pressroom_common::ImageModel;

/// Substituted for any image whose generation failed. Carries a marker the
/// storage-transfer step recognizes as a passthrough.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://placehold.invalid/800x600.png?text=generation-failed";

/// Placeholder/mock refs are never downloaded or re-uploaded; they pass
/// through the storage transfer unchanged.
pub fn is_placeholder(url: &str) -> bool {
    url.contains("generation-failed") || url.contains("mock") || url.contains("placehold")
}

/// Batch image generation, dispatching to one of two backend families by
/// model selector. A single failed image never aborts the batch.
pub struct ImageGenerator {
    flat: Arc<dyn ImageSynth>,
    infographic: Arc<dyn ImageSynth>,
}

impl ImageGenerator {
    pub fn new(flat: Arc<dyn ImageSynth>, infographic: Arc<dyn ImageSynth>) -> Self {
        Self { flat, infographic }
    }

    /// One output per non-empty input prompt. Failed items are substituted
    /// with [`PLACEHOLDER_IMAGE_URL`].
    pub async fn generate(&self, prompts: &[String], model: ImageModel) -> Vec<String> {
        let backend = match model {
            ImageModel::Flat => &self.flat,
            ImageModel::Infographic => &self.infographic,
        };

        let mut urls = Vec::with_capacity(prompts.len());
        for (index, prompt) in prompts.iter().enumerate() {
            if prompt.is_empty() {
                continue;
            }
            match backend.synthesize(prompt).await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    error!(index, model = %model, error = %e, "Image generation failed");
                    urls.push(PLACEHOLDER_IMAGE_URL.to_string());
                }
            }
        }
        info!(count = urls.len(), model = %model, "Images generated");
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailOnTrigger, FixedImageSynth};

    fn prompts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn length_preserving_for_nonempty_prompts() {
        let backend = Arc::new(FixedImageSynth::new("https://img.example/a.png"));
        let gen = ImageGenerator::new(backend.clone(), backend);
        let urls = gen
            .generate(&prompts(&["a", "b", "c", "d"]), ImageModel::Flat)
            .await;
        assert_eq!(urls.len(), 4);
    }

    #[tokio::test]
    async fn skips_empty_prompts() {
        let backend = Arc::new(FixedImageSynth::new("https://img.example/a.png"));
        let gen = ImageGenerator::new(backend.clone(), backend);
        let urls = gen.generate(&prompts(&["a", "", "c"]), ImageModel::Flat).await;
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn failed_item_becomes_placeholder_others_survive() {
        let backend = Arc::new(FailOnTrigger::new("boom", "https://img.example/ok.png"));
        let gen = ImageGenerator::new(backend.clone(), backend);
        let urls = gen
            .generate(&prompts(&["a", "b", "boom please", "d"]), ImageModel::Flat)
            .await;
        assert_eq!(urls.len(), 4);
        assert_eq!(urls[2], PLACEHOLDER_IMAGE_URL);
        assert!(urls[0].starts_with("https://img.example/"));
        assert!(urls[1].starts_with("https://img.example/"));
        assert!(urls[3].starts_with("https://img.example/"));
        assert!(is_placeholder(&urls[2]));
    }
}
