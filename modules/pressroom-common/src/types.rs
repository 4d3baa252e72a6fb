use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Literal delimiter the Writer embeds between article sections so images can
/// be interleaved. Exactly two markers split the body into three parts.
pub const SECTION_MARKER: &str = "[SPLIT]";

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// One row of the analytics top-pages report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageStat {
    pub title: String,
    pub path: String,
    pub views: u64,
}

/// Daily analytics snapshot. Immutable once fetched; input to the Analyst only.
///
/// A provider failure produces a snapshot with `error` set and no pages —
/// that is still valid (empty) input, never a reason to abort the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub date: String,
    #[serde(default)]
    pub top_pages: Vec<PageStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Agent outputs
// ---------------------------------------------------------------------------

/// What the Analyst returns: the editorial direction and the topic to write on.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Editorial direction / reasoning behind the topic choice.
    pub direction: String,
    /// Chosen topic. Always non-empty; the agent substitutes a fallback when
    /// the model output is unparsable.
    pub topic: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Marketing strategy for one article.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Strategy {
    pub title: String,
    pub marketing_angle: String,
    /// Ordered section labels the Writer should follow.
    pub article_structure: Vec<String>,
    #[serde(default)]
    pub tone_guide: String,
}

/// Outcome of the quality gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ReviewStatus {
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "REVIEW_REQUIRED")]
    ReviewRequired,
}

/// Controller verdict for one draft. Produced once; terminal for the draft's
/// auto-publish eligibility.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReviewVerdict {
    pub status: ReviewStatus,
    /// 0–100.
    pub score: u8,
    pub comments: String,
}

// ---------------------------------------------------------------------------
// Draft record
// ---------------------------------------------------------------------------

/// Lifecycle of one article draft. Status only ever moves forward:
/// draft → reviewed → {approved, review_required, posted}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Draft,
    Reviewed,
    Approved,
    ReviewRequired,
    Posted,
}

impl DraftStatus {
    fn rank(self) -> u8 {
        match self {
            DraftStatus::Draft => 0,
            DraftStatus::Reviewed => 1,
            DraftStatus::Approved | DraftStatus::ReviewRequired => 2,
            DraftStatus::Posted => 3,
        }
    }

    /// Forward-only transition check. A draft never regresses.
    pub fn can_advance_to(self, next: DraftStatus) -> bool {
        next.rank() > self.rank()
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DraftStatus::Draft => "draft",
            DraftStatus::Reviewed => "reviewed",
            DraftStatus::Approved => "approved",
            DraftStatus::ReviewRequired => "review_required",
            DraftStatus::Posted => "posted",
        };
        f.write_str(s)
    }
}

/// The persisted, evolving record representing one article from topic
/// selection through publish. Fields accumulate as stages complete.
///
/// `image_urls` ordering: index 0 is the thumbnail, indices 1–3 map to the
/// first three structural sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub id: String,
    pub report_id: String,
    pub topic: String,
    pub status: DraftStatus,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub image_prompts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_model: Option<ImageModel>,
    /// Stored structurally, never as a stringified blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_strategy: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_report: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewVerdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_post_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_article_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleDraft {
    pub fn new(id: String, report_id: String, topic: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            report_id,
            topic,
            status: DraftStatus::Draft,
            content: String::new(),
            image_urls: Vec::new(),
            image_prompts: Vec::new(),
            image_model: None,
            marketing_strategy: None,
            analysis_report: None,
            review: None,
            cms_post_id: None,
            store_article_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. `None` fields are untouched. Status changes
    /// obey the forward-only rule; setting the current status again is a
    /// no-op, a regression is rejected.
    pub fn apply_patch(&mut self, patch: DraftPatch) -> Result<(), crate::PressroomError> {
        if let Some(next) = patch.status {
            if next != self.status && !self.status.can_advance_to(next) {
                return Err(crate::PressroomError::Validation(format!(
                    "draft {} cannot move {} -> {next}",
                    self.id, self.status
                )));
            }
            self.status = next;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(image_urls) = patch.image_urls {
            self.image_urls = image_urls;
        }
        if let Some(image_prompts) = patch.image_prompts {
            self.image_prompts = image_prompts;
        }
        if let Some(image_model) = patch.image_model {
            self.image_model = Some(image_model);
        }
        if let Some(strategy) = patch.marketing_strategy {
            self.marketing_strategy = Some(strategy);
        }
        if let Some(analysis) = patch.analysis_report {
            self.analysis_report = Some(analysis);
        }
        if let Some(review) = patch.review {
            self.review = Some(review);
        }
        if let Some(cms_post_id) = patch.cms_post_id {
            self.cms_post_id = Some(cms_post_id);
        }
        if let Some(store_article_id) = patch.store_article_id {
            self.store_article_id = Some(store_article_id);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Partial update applied to a draft after a stage transition. `None` fields
/// are left untouched by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftPatch {
    pub status: Option<DraftStatus>,
    pub content: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub image_prompts: Option<Vec<String>>,
    pub image_model: Option<ImageModel>,
    pub marketing_strategy: Option<Strategy>,
    pub analysis_report: Option<AnalysisResult>,
    pub review: Option<ReviewVerdict>,
    pub cms_post_id: Option<String>,
    pub store_article_id: Option<String>,
}

impl DraftPatch {
    pub fn status(status: DraftStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Image model selector
// ---------------------------------------------------------------------------

/// Which image-generation family to use for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageModel {
    /// Flat illustration, no embedded text.
    #[default]
    Flat,
    /// Infographic with embedded localized text.
    Infographic,
}

impl ImageModel {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageModel::Flat => "flat",
            ImageModel::Infographic => "infographic",
        }
    }
}

impl FromStr for ImageModel {
    type Err = crate::PressroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(ImageModel::Flat),
            "infographic" => Ok(ImageModel::Infographic),
            other => Err(crate::PressroomError::Validation(format!(
                "unknown image model '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Process-wide settings, fetched fresh per run. Mutated only through the
/// settings endpoints, read-only to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default = "default_articles_per_run")]
    pub articles_per_run: u32,
    #[serde(default)]
    pub auto_post_store: bool,
    #[serde(default)]
    pub default_image_model: ImageModel,
}

fn default_articles_per_run() -> u32 {
    1
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            articles_per_run: 1,
            auto_post_store: false,
            default_image_model: ImageModel::Flat,
        }
    }
}

// ---------------------------------------------------------------------------
// Run outcome & notifications
// ---------------------------------------------------------------------------

/// Notification severity. Delivery is fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Skipped,
    Error,
}

/// Result of one orchestrator invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
}

impl RunOutcome {
    pub fn success(message: impl Into<String>, topic: Option<String>, draft_id: Option<String>) -> Self {
        Self {
            status: RunStatus::Success,
            message: message.into(),
            topic,
            draft_id,
        }
    }

    pub fn skipped(message: impl Into<String>, topic: Option<String>) -> Self {
        Self {
            status: RunStatus::Skipped,
            message: message.into(),
            topic,
            draft_id: None,
        }
    }

    pub fn error(message: impl Into<String>, topic: Option<String>) -> Self {
        Self {
            status: RunStatus::Error,
            message: message.into(),
            topic,
            draft_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_never_regresses() {
        assert!(DraftStatus::Draft.can_advance_to(DraftStatus::Reviewed));
        assert!(DraftStatus::Reviewed.can_advance_to(DraftStatus::Approved));
        assert!(DraftStatus::Reviewed.can_advance_to(DraftStatus::ReviewRequired));
        assert!(DraftStatus::Approved.can_advance_to(DraftStatus::Posted));
        assert!(!DraftStatus::Reviewed.can_advance_to(DraftStatus::Draft));
        assert!(!DraftStatus::Posted.can_advance_to(DraftStatus::Approved));
        assert!(!DraftStatus::Approved.can_advance_to(DraftStatus::ReviewRequired));
    }

    #[test]
    fn patch_rejects_status_regression_but_allows_restating() {
        let mut draft = ArticleDraft::new("d".into(), "r".into(), "t".into());
        draft
            .apply_patch(DraftPatch::status(DraftStatus::Reviewed))
            .unwrap();
        assert!(draft
            .apply_patch(DraftPatch::status(DraftStatus::Draft))
            .is_err());
        // Same status again is fine (e.g. a republish of a posted draft).
        draft
            .apply_patch(DraftPatch::status(DraftStatus::Reviewed))
            .unwrap();
        assert_eq!(draft.status, DraftStatus::Reviewed);
    }

    #[test]
    fn patch_leaves_unset_fields_untouched() {
        let mut draft = ArticleDraft::new("d".into(), "r".into(), "t".into());
        draft
            .apply_patch(DraftPatch {
                content: Some("body".into()),
                ..DraftPatch::default()
            })
            .unwrap();
        draft
            .apply_patch(DraftPatch::status(DraftStatus::Reviewed))
            .unwrap();
        assert_eq!(draft.content, "body");
    }

    #[test]
    fn review_status_wire_form() {
        let v: ReviewStatus = serde_json::from_str("\"APPROVED\"").unwrap();
        assert_eq!(v, ReviewStatus::Approved);
        let v: ReviewStatus = serde_json::from_str("\"REVIEW_REQUIRED\"").unwrap();
        assert_eq!(v, ReviewStatus::ReviewRequired);
    }

    #[test]
    fn image_model_round_trip() {
        assert_eq!("flat".parse::<ImageModel>().unwrap(), ImageModel::Flat);
        assert_eq!(
            "infographic".parse::<ImageModel>().unwrap(),
            ImageModel::Infographic
        );
        assert!("dalle".parse::<ImageModel>().is_err());
    }

    #[test]
    fn settings_defaults() {
        let s: SystemSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s.articles_per_run, 1);
        assert!(!s.auto_post_store);
        assert_eq!(s.default_image_model, ImageModel::Flat);
    }
}
