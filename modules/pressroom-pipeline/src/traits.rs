// Trait abstractions for every pipeline collaborator.
//
// The orchestrator is constructed with explicit handles to these interfaces —
// no ambient global clients. They also enable deterministic testing with the
// mocks in `testing.rs`: no network, no disk, `cargo test` in seconds.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pressroom_common::{
    AnalyticsSnapshot, ArticleDraft, DraftPatch, Severity, SystemSettings,
};

// ---------------------------------------------------------------------------
// AnalyticsProvider
// ---------------------------------------------------------------------------

#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    /// Fetch the top-pages snapshot for the day `days_ago` days back.
    /// Provider failures come back as an error-shaped snapshot, not `Err`.
    async fn fetch_snapshot(&self, days_ago: u32) -> Result<AnalyticsSnapshot>;
}

// ---------------------------------------------------------------------------
// DraftStore
// ---------------------------------------------------------------------------

/// Durable store for analytics reports, article drafts, and settings.
/// Single-writer per draft: only the run that created a draft mutates it.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn create_report(&self, snapshot: &AnalyticsSnapshot) -> Result<String>;

    async fn create_draft(&self, report_id: &str, topic: &str) -> Result<String>;

    async fn update_draft(&self, id: &str, patch: DraftPatch) -> Result<()>;

    async fn get_draft(&self, id: &str) -> Result<Option<ArticleDraft>>;

    /// Exact-match topic lookup within the lookback window.
    async fn topic_exists(&self, topic: &str) -> Result<bool>;

    /// Most recent drafts, newest first.
    async fn recent_drafts(&self, limit: usize) -> Result<Vec<ArticleDraft>>;

    async fn settings(&self) -> Result<SystemSettings>;

    async fn save_settings(&self, settings: &SystemSettings) -> Result<()>;
}

// ---------------------------------------------------------------------------
// ObjectStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist bytes and return the public URL.
    async fn put(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> Result<String>;

    /// Unique storage path under `prefix` with the given extension.
    fn make_filename(&self, prefix: &str, extension: &str) -> String;
}

// ---------------------------------------------------------------------------
// CmsClient
// ---------------------------------------------------------------------------

/// REST CMS target. Null-safe: every call returns `Ok(None)` when the client
/// is unconfigured or the individual call fails.
#[async_trait]
pub trait CmsClient: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Upload the image behind `image_url` to the CMS media library.
    async fn upload_media(&self, image_url: &str) -> Result<Option<u64>>;

    /// Create a published post; returns the post id.
    async fn create_post(
        &self,
        title: &str,
        content: &str,
        featured_media: Option<u64>,
    ) -> Result<Option<u64>>;
}

// ---------------------------------------------------------------------------
// HeadlessStore
// ---------------------------------------------------------------------------

/// Article row inserted into the headless store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreArticle {
    pub title: String,
    pub content: String,
    pub thumbnail_url: Option<String>,
    pub slug: String,
    pub published: bool,
}

#[async_trait]
pub trait HeadlessStore: Send + Sync {
    /// Transfer the image behind `image_url` into store-owned storage.
    /// `Ok(None)` on upload failure — callers fall back to the source URL.
    async fn upload_image(&self, image_url: &str, filename: &str) -> Result<Option<String>>;

    /// Insert one article record, returning its id. Failures propagate.
    async fn insert_article(&self, article: &StoreArticle) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Fire-and-forget notifications. Implementations log delivery failures and
/// never propagate them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, severity: Severity);
}

// ---------------------------------------------------------------------------
// MediaFetcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
