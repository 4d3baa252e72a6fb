//! JSON-file draft store: one file per report and per draft under a data
//! directory, plus a single settings file. Good for a single-process
//! deployment; the trait boundary leaves room for a database later.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use pressroom_common::{AnalyticsSnapshot, ArticleDraft, DraftPatch, SystemSettings};
use pressroom_pipeline::traits::DraftStore;

pub struct JsonDraftStore {
    data_dir: PathBuf,
}

impl JsonDraftStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn drafts_dir(&self) -> PathBuf {
        self.data_dir.join("drafts")
    }

    fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }

    fn draft_path(&self, id: &str) -> PathBuf {
        self.drafts_dir().join(format!("{id}.json"))
    }

    fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    async fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.drafts_dir()).await?;
        fs::create_dir_all(self.reports_dir()).await?;
        Ok(())
    }

    async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)?;
        fs::write(path, json)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    async fn read_draft(&self, id: &str) -> Result<Option<ArticleDraft>> {
        let path = self.draft_path(id);
        match fs::read(&path).await {
            Ok(bytes) => {
                let draft = serde_json::from_slice(&bytes)
                    .with_context(|| format!("parsing {}", path.display()))?;
                Ok(Some(draft))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn all_drafts(&self) -> Result<Vec<ArticleDraft>> {
        let dir = self.drafts_dir();
        let mut drafts = Vec::new();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(drafts),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<ArticleDraft>(&bytes) {
                Ok(draft) => drafts.push(draft),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable draft file");
                }
            }
        }
        Ok(drafts)
    }
}

#[async_trait]
impl DraftStore for JsonDraftStore {
    async fn create_report(&self, snapshot: &AnalyticsSnapshot) -> Result<String> {
        self.ensure_dirs().await?;
        let id = Uuid::new_v4().to_string();
        let path = self.reports_dir().join(format!("{id}.json"));
        Self::write_json(&path, snapshot).await?;
        Ok(id)
    }

    async fn create_draft(&self, report_id: &str, topic: &str) -> Result<String> {
        self.ensure_dirs().await?;
        let id = Uuid::new_v4().to_string();
        let draft = ArticleDraft::new(id.clone(), report_id.to_string(), topic.to_string());
        Self::write_json(&self.draft_path(&id), &draft).await?;
        Ok(id)
    }

    async fn update_draft(&self, id: &str, patch: DraftPatch) -> Result<()> {
        let mut draft = self
            .read_draft(id)
            .await?
            .ok_or_else(|| anyhow!("draft {id} not found"))?;
        draft.apply_patch(patch)?;
        Self::write_json(&self.draft_path(id), &draft).await
    }

    async fn get_draft(&self, id: &str) -> Result<Option<ArticleDraft>> {
        self.read_draft(id).await
    }

    async fn topic_exists(&self, topic: &str) -> Result<bool> {
        Ok(self.all_drafts().await?.iter().any(|d| d.topic == topic))
    }

    async fn recent_drafts(&self, limit: usize) -> Result<Vec<ArticleDraft>> {
        let mut drafts = self.all_drafts().await?;
        drafts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        drafts.truncate(limit);
        Ok(drafts)
    }

    async fn settings(&self) -> Result<SystemSettings> {
        match fs::read(self.settings_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SystemSettings::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_settings(&self, settings: &SystemSettings) -> Result<()> {
        fs::create_dir_all(&self.data_dir).await?;
        Self::write_json(&self.settings_path(), settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_common::DraftStatus;

    #[tokio::test]
    async fn draft_round_trip_with_patch() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDraftStore::new(dir.path());

        let report_id = store
            .create_report(&AnalyticsSnapshot::default())
            .await
            .unwrap();
        let id = store.create_draft(&report_id, "one-pot pasta").await.unwrap();

        store
            .update_draft(
                &id,
                DraftPatch {
                    content: Some("body".to_string()),
                    status: Some(DraftStatus::Reviewed),
                    ..DraftPatch::default()
                },
            )
            .await
            .unwrap();

        let draft = store.get_draft(&id).await.unwrap().unwrap();
        assert_eq!(draft.status, DraftStatus::Reviewed);
        assert_eq!(draft.content, "body");
        assert!(store.topic_exists("one-pot pasta").await.unwrap());
        assert!(!store.topic_exists("something else").await.unwrap());
    }

    #[tokio::test]
    async fn status_regression_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDraftStore::new(dir.path());
        let report_id = store
            .create_report(&AnalyticsSnapshot::default())
            .await
            .unwrap();
        let id = store.create_draft(&report_id, "t").await.unwrap();

        store
            .update_draft(&id, DraftPatch::status(DraftStatus::Approved))
            .await
            .unwrap();
        assert!(store
            .update_draft(&id, DraftPatch::status(DraftStatus::Draft))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn recent_drafts_newest_first_with_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDraftStore::new(dir.path());
        let report_id = store
            .create_report(&AnalyticsSnapshot::default())
            .await
            .unwrap();
        for topic in ["a", "b", "c"] {
            store.create_draft(&report_id, topic).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let recent = store.recent_drafts(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].topic, "c");
        assert_eq!(recent[1].topic, "b");
    }

    #[tokio::test]
    async fn settings_default_then_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDraftStore::new(dir.path());

        let settings = store.settings().await.unwrap();
        assert!(!settings.auto_post_store);

        let mut settings = settings;
        settings.auto_post_store = true;
        settings.articles_per_run = 3;
        store.save_settings(&settings).await.unwrap();

        let reloaded = store.settings().await.unwrap();
        assert!(reloaded.auto_post_store);
        assert_eq!(reloaded.articles_per_run, 3);
    }
}
