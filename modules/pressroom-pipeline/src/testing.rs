//! In-memory collaborator doubles for pipeline tests. Deterministic, no
//! network, no disk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use pressroom_common::{
    AnalyticsSnapshot, ArticleDraft, DraftPatch, PageStat, Severity, SystemSettings,
};

use crate::traits::{
    AnalyticsProvider, CmsClient, DraftStore, HeadlessStore, MediaFetcher, Notifier, ObjectStore,
    StoreArticle,
};

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Returns a fixed snapshot on every fetch.
pub struct MockAnalytics {
    snapshot: AnalyticsSnapshot,
}

impl MockAnalytics {
    pub fn new() -> Self {
        Self {
            snapshot: AnalyticsSnapshot {
                date: "2026-08-28".to_string(),
                top_pages: vec![
                    PageStat {
                        title: "15-minute miso noodle soup".to_string(),
                        path: "/recipes/miso-noodle-soup".to_string(),
                        views: 412,
                    },
                    PageStat {
                        title: "Sheet-pan gnocchi".to_string(),
                        path: "/recipes/sheet-pan-gnocchi".to_string(),
                        views: 288,
                    },
                ],
                error: None,
            },
        }
    }

    pub fn with_snapshot(snapshot: AnalyticsSnapshot) -> Self {
        Self { snapshot }
    }
}

impl Default for MockAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalyticsProvider for MockAnalytics {
    async fn fetch_snapshot(&self, _days_ago: u32) -> Result<AnalyticsSnapshot> {
        Ok(self.snapshot.clone())
    }
}

// ---------------------------------------------------------------------------
// Draft store
// ---------------------------------------------------------------------------

/// Fully functional in-memory draft store with the same forward-only status
/// rule as the durable implementation.
#[derive(Default)]
pub struct MemoryDraftStore {
    next_id: AtomicU64,
    reports: Mutex<Vec<String>>,
    drafts: Mutex<HashMap<String, ArticleDraft>>,
    order: Mutex<Vec<String>>,
    settings: Mutex<SystemSettings>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(self, settings: SystemSettings) -> Self {
        *self.settings.lock().unwrap() = settings;
        self
    }

    /// Pre-seed a draft record, e.g. for duplicate-guard tests.
    pub fn with_draft(self, draft: ArticleDraft) -> Self {
        self.order.lock().unwrap().push(draft.id.clone());
        self.drafts.lock().unwrap().insert(draft.id.clone(), draft);
        self
    }

    pub fn draft_count(&self) -> usize {
        self.drafts.lock().unwrap().len()
    }

    pub fn draft(&self, id: &str) -> Option<ArticleDraft> {
        self.drafts.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn create_report(&self, _snapshot: &AnalyticsSnapshot) -> Result<String> {
        let id = format!("report-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.reports.lock().unwrap().push(id.clone());
        Ok(id)
    }

    async fn create_draft(&self, report_id: &str, topic: &str) -> Result<String> {
        let id = format!("draft-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let draft = ArticleDraft::new(id.clone(), report_id.to_string(), topic.to_string());
        self.order.lock().unwrap().push(id.clone());
        self.drafts.lock().unwrap().insert(id.clone(), draft);
        Ok(id)
    }

    async fn update_draft(&self, id: &str, patch: DraftPatch) -> Result<()> {
        let mut drafts = self.drafts.lock().unwrap();
        let draft = drafts
            .get_mut(id)
            .ok_or_else(|| anyhow!("draft {id} not found"))?;
        draft.apply_patch(patch)?;
        Ok(())
    }

    async fn get_draft(&self, id: &str) -> Result<Option<ArticleDraft>> {
        Ok(self.drafts.lock().unwrap().get(id).cloned())
    }

    async fn topic_exists(&self, topic: &str) -> Result<bool> {
        Ok(self
            .drafts
            .lock()
            .unwrap()
            .values()
            .any(|d| d.topic == topic))
    }

    async fn recent_drafts(&self, limit: usize) -> Result<Vec<ArticleDraft>> {
        let order = self.order.lock().unwrap();
        let drafts = self.drafts.lock().unwrap();
        Ok(order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| drafts.get(id).cloned())
            .collect())
    }

    async fn settings(&self) -> Result<SystemSettings> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save_settings(&self, settings: &SystemSettings) -> Result<()> {
        *self.settings.lock().unwrap() = settings.clone();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

/// Records every put and returns a synthetic public URL.
#[derive(Default)]
pub struct MockObjectStore {
    puts: Mutex<Vec<String>>,
    counter: AtomicU64,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_paths(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put(&self, _bytes: Vec<u8>, path: &str, _content_type: &str) -> Result<String> {
        self.puts.lock().unwrap().push(path.to_string());
        Ok(format!("https://objects.test/{path}"))
    }

    fn make_filename(&self, prefix: &str, extension: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}/{n}.{extension}")
    }
}

// ---------------------------------------------------------------------------
// CMS
// ---------------------------------------------------------------------------

/// Scriptable CMS double. Defaults to configured and always succeeding.
pub struct MockCms {
    configured: bool,
    fail_media: bool,
    media_counter: AtomicU64,
    pub posts: Mutex<Vec<(String, String, Option<u64>)>>,
}

impl MockCms {
    pub fn new() -> Self {
        Self {
            configured: true,
            fail_media: false,
            media_counter: AtomicU64::new(1),
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn failing_media(mut self) -> Self {
        self.fail_media = true;
        self
    }
}

impl Default for MockCms {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CmsClient for MockCms {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn upload_media(&self, _image_url: &str) -> Result<Option<u64>> {
        if self.fail_media {
            return Ok(None);
        }
        Ok(Some(self.media_counter.fetch_add(1, Ordering::SeqCst)))
    }

    async fn create_post(
        &self,
        title: &str,
        content: &str,
        featured_media: Option<u64>,
    ) -> Result<Option<u64>> {
        let mut posts = self.posts.lock().unwrap();
        posts.push((title.to_string(), content.to_string(), featured_media));
        Ok(Some(posts.len() as u64))
    }
}

// ---------------------------------------------------------------------------
// Headless store
// ---------------------------------------------------------------------------

/// Headless-store double with switchable insert failure.
pub struct MockHeadless {
    fail_insert: bool,
    fail_upload: bool,
    pub articles: Mutex<Vec<StoreArticle>>,
}

impl MockHeadless {
    pub fn new() -> Self {
        Self {
            fail_insert: false,
            fail_upload: false,
            articles: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_insert(mut self) -> Self {
        self.fail_insert = true;
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }
}

impl Default for MockHeadless {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HeadlessStore for MockHeadless {
    async fn upload_image(&self, _image_url: &str, filename: &str) -> Result<Option<String>> {
        if self.fail_upload {
            return Ok(None);
        }
        Ok(Some(format!("https://store.test/media/{filename}")))
    }

    async fn insert_article(&self, article: &StoreArticle) -> Result<String> {
        if self.fail_insert {
            bail!("insert rejected");
        }
        let mut articles = self.articles.lock().unwrap();
        articles.push(article.clone());
        Ok(format!("article-{}", articles.len()))
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Captures every notification for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count_of(&self, severity: Severity) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, s)| *s == severity)
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}

// ---------------------------------------------------------------------------
// Media fetcher
// ---------------------------------------------------------------------------

/// Returns a tiny byte payload for any URL.
#[derive(Default)]
pub struct MockMediaFetcher;

impl MockMediaFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaFetcher for MockMediaFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(url.as_bytes().to_vec())
    }
}
