use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use pressroom_common::Strategy;

use crate::assembler::{assemble, BodyImage};
use crate::publish::PublishTarget;
use crate::traits::{HeadlessStore, StoreArticle};

/// Headless-store target: transfers all four images into store-owned storage
/// under per-run filenames, assembles inline-markdown content, and inserts
/// one published article row keyed by the draft id.
pub struct HeadlessTarget {
    store: Arc<dyn HeadlessStore>,
}

impl HeadlessTarget {
    pub fn new(store: Arc<dyn HeadlessStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PublishTarget for HeadlessTarget {
    fn name(&self) -> &'static str {
        "headless-store"
    }

    async fn publish(
        &self,
        draft_id: &str,
        strategy: &Strategy,
        content: &str,
        image_urls: &[String],
    ) -> Result<Option<String>> {
        // Transfer images. Order: [thumbnail, section1, section2, section3].
        // Per-image upload failure falls back to the source URL.
        let mut store_urls = Vec::with_capacity(image_urls.len());
        for (index, url) in image_urls.iter().enumerate() {
            let filename = format!("{}-{draft_id}-{index}.png", Utc::now().timestamp_millis());
            match self.store.upload_image(url, &filename).await? {
                Some(store_url) => store_urls.push(store_url),
                None => {
                    warn!(draft_id, index, "Image transfer failed, keeping source URL");
                    store_urls.push(url.clone());
                }
            }
        }

        let body_images: Vec<Option<BodyImage>> = store_urls
            .iter()
            .skip(1)
            .map(|url| Some(BodyImage::Inline { url: url.clone() }))
            .collect();
        let final_content = assemble(content, &body_images);

        let article_id = self
            .store
            .insert_article(&StoreArticle {
                title: strategy.title.clone(),
                content: final_content,
                thumbnail_url: store_urls.first().cloned(),
                slug: draft_id.to_string(),
                published: true,
            })
            .await?;

        info!(draft_id, article_id, "Article inserted into headless store");
        Ok(Some(article_id))
    }
}
