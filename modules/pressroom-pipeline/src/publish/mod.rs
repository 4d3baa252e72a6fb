//! Publish targets: external platforms that accept a finished article.

mod cms;
mod headless;

use anyhow::Result;
use async_trait::async_trait;

use pressroom_common::Strategy;

pub use cms::CmsTarget;
pub use headless::HeadlessTarget;

/// One external content platform.
#[async_trait]
pub trait PublishTarget: Send + Sync {
    /// A short name for logs and notifications.
    fn name(&self) -> &'static str;

    /// Publish the assembled article. `Ok(None)` means the target is a
    /// configured no-op (e.g. credentials absent); `Ok(Some(id))` is the
    /// persisted post/article id. `Err` is a publish failure the orchestrator
    /// degrades on.
    async fn publish(
        &self,
        draft_id: &str,
        strategy: &Strategy,
        content: &str,
        image_urls: &[String],
    ) -> Result<Option<String>>;
}
