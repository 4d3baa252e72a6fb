use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use pressroom_common::Strategy;

use crate::assembler::{assemble, BodyImage};
use crate::publish::PublishTarget;
use crate::traits::CmsClient;

/// CMS-post target: uploads section images as media objects, embeds them as
/// blocks, sets the thumbnail as the featured image, and publishes the post.
pub struct CmsTarget {
    cms: Arc<dyn CmsClient>,
}

impl CmsTarget {
    pub fn new(cms: Arc<dyn CmsClient>) -> Self {
        Self { cms }
    }
}

#[async_trait]
impl PublishTarget for CmsTarget {
    fn name(&self) -> &'static str {
        "cms"
    }

    async fn publish(
        &self,
        draft_id: &str,
        strategy: &Strategy,
        content: &str,
        image_urls: &[String],
    ) -> Result<Option<String>> {
        if !self.cms.is_configured() {
            info!(draft_id, "CMS credentials not set, skipping post creation");
            return Ok(None);
        }

        // Section images 1-3. A failed media upload is simply omitted from
        // the embed rather than failing the post.
        let mut body_images = Vec::new();
        for url in image_urls.iter().skip(1).take(3) {
            match self.cms.upload_media(url).await? {
                Some(media_id) => body_images.push(Some(BodyImage::Block {
                    media_id,
                    url: url.clone(),
                })),
                None => {
                    warn!(draft_id, url, "Media upload returned no id, omitting embed");
                    body_images.push(None);
                }
            }
        }

        let html = assemble(content, &body_images);

        let featured = match image_urls.first() {
            Some(thumbnail_url) => self.cms.upload_media(thumbnail_url).await?,
            None => None,
        };

        let post_id = self.cms.create_post(&strategy.title, &html, featured).await?;
        if let Some(id) = post_id {
            info!(draft_id, post_id = id, "CMS post created");
        }
        Ok(post_id.map(|id| id.to_string()))
    }
}
