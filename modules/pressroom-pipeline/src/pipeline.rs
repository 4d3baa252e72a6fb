//! The pipeline orchestrator: sequences every stage of one article run,
//! owns the draft state machine, and branches into publish actions.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;
use typed_builder::TypedBuilder;

use ai_client::{ImageSynth, TextModel};
use pressroom_agents::{
    is_placeholder, Analyst, Controller, Designer, ImageGenerator, Marketer, Writer,
};
use pressroom_common::{
    ArticleDraft, DraftPatch, DraftStatus, ImageModel, ReviewStatus, RunOutcome, RunStatus,
    Severity, Strategy,
};

use crate::guard::DuplicateGuard;
use crate::publish::PublishTarget;
use crate::run_state::RunHandle;
use crate::traits::{AnalyticsProvider, DraftStore, MediaFetcher, Notifier, ObjectStore};

/// How many recent drafts are rendered into the Marketer's variety context.
const RECENT_CONTEXT_LIMIT: usize = 5;

/// Every collaborator handle the orchestrator needs. Explicit injection —
/// construct once at startup, no ambient globals.
#[derive(TypedBuilder)]
pub struct PipelineDeps {
    pub analytics: Arc<dyn AnalyticsProvider>,
    pub store: Arc<dyn DraftStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub media: Arc<dyn MediaFetcher>,
    pub notifier: Arc<dyn Notifier>,
    pub text_model: Arc<dyn TextModel>,
    pub flat_images: Arc<dyn ImageSynth>,
    pub infographic_images: Arc<dyn ImageSynth>,
    /// Zero or more publish actions attempted on approval + auto-post.
    #[builder(default)]
    pub publish_targets: Vec<Arc<dyn PublishTarget>>,
}

pub struct Pipeline {
    analytics: Arc<dyn AnalyticsProvider>,
    store: Arc<dyn DraftStore>,
    objects: Arc<dyn ObjectStore>,
    media: Arc<dyn MediaFetcher>,
    notifier: Arc<dyn Notifier>,
    publish_targets: Vec<Arc<dyn PublishTarget>>,

    analyst: Analyst,
    marketer: Marketer,
    writer: Writer,
    designer: Designer,
    controller: Controller,
    images: ImageGenerator,
    guard: DuplicateGuard,
    state: RunHandle,
}

impl Pipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        let guard = DuplicateGuard::new(deps.store.clone());
        Self {
            analyst: Analyst::new(deps.text_model.clone()),
            marketer: Marketer::new(deps.text_model.clone()),
            writer: Writer::new(deps.text_model.clone()),
            designer: Designer::new(deps.text_model.clone()),
            controller: Controller::new(deps.text_model),
            images: ImageGenerator::new(deps.flat_images, deps.infographic_images),
            guard,
            state: RunHandle::new(),
            analytics: deps.analytics,
            store: deps.store,
            objects: deps.objects,
            media: deps.media,
            notifier: deps.notifier,
            publish_targets: deps.publish_targets,
        }
    }

    /// Read-only handle for progress pollers.
    pub fn run_state(&self) -> RunHandle {
        self.state.clone()
    }

    /// Execute one full pipeline run. Total: every failure is caught here,
    /// notified, and folded into the outcome — the host process never sees
    /// a panic or an `Err` from a run.
    pub async fn run(&self, image_model: ImageModel, avoid_topics: &[String]) -> RunOutcome {
        self.state.reset();
        self.state.log(
            &format!("Starting content pipeline (image model: {image_model})"),
            Severity::Info,
        );

        match self.run_inner(image_model, avoid_topics).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("Pipeline failed: {e:#}");
                self.state.log(&message, Severity::Error);
                self.state.set_label(&message);
                self.notifier.notify(&message, Severity::Error).await;
                RunOutcome::error(message, None)
            }
        }
    }

    /// Batch mode: N sequential runs. Later iterations see earlier chosen
    /// topics through the avoid-list, so the Analyst is steered away from
    /// them; the DuplicateGuard stays the authoritative backstop.
    pub async fn run_batch(&self, count: u32, image_model: ImageModel) -> Vec<RunOutcome> {
        let mut avoid_topics: Vec<String> = Vec::new();
        let mut outcomes = Vec::with_capacity(count as usize);

        for iteration in 0..count {
            info!(iteration = iteration + 1, total = count, "Batch iteration");
            let outcome = self.run(image_model, &avoid_topics).await;
            if outcome.status != RunStatus::Skipped {
                if let Some(topic) = &outcome.topic {
                    avoid_topics.push(topic.clone());
                }
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn run_inner(
        &self,
        image_model: ImageModel,
        avoid_topics: &[String],
    ) -> Result<RunOutcome> {
        // Step 1: data acquisition.
        self.state.set_stage("Step 1/6: Fetching analytics data...", 10);
        let snapshot = self.analytics.fetch_snapshot(1).await?;
        if let Some(provider_error) = &snapshot.error {
            self.state.log(
                &format!("Analytics provider degraded, continuing with empty snapshot: {provider_error}"),
                Severity::Warning,
            );
        }
        let report_id = self
            .store
            .create_report(&snapshot)
            .await
            .context("saving analytics report")?;

        // Step 2: analysis and duplicate suppression. The only short-circuit
        // exit before a draft record exists.
        self.state.set_stage("Step 2/6: Analyzing data...", 25);
        let analysis = self.analyst.analyze(&snapshot, avoid_topics).await?;
        let topic = analysis.topic.clone();
        self.state
            .log(&format!("Topic decided: {topic}"), Severity::Info);

        if self.guard.is_duplicate(&topic).await {
            let message = format!("Topic '{topic}' already covered recently. Skipping.");
            self.state.log(&message, Severity::Warning);
            self.state.set_stage("Skipped", 100);
            self.notifier
                .notify(&format!("Skipped: {message}"), Severity::Warning)
                .await;
            return Ok(RunOutcome::skipped(message, Some(topic)));
        }

        let recent = self.store.recent_drafts(RECENT_CONTEXT_LIMIT).await?;
        let recent_context = render_recent_context(&recent)?;

        // Step 3: marketing strategy, then the draft record is born.
        self.state.set_stage("Step 3/6: Creating marketing strategy...", 40);
        let strategy = self.marketer.create_strategy(&analysis, &recent_context).await?;
        let draft_id = self.store.create_draft(&report_id, &topic).await?;
        self.state
            .log(&format!("Draft created: {draft_id}"), Severity::Info);

        // Step 4: writing.
        self.state.set_stage("Step 4/6: Writing article...", 55);
        let content = self.writer.write_article(&strategy).await?;
        self.state.log(
            &format!("Article content written ({} chars)", content.chars().count()),
            Severity::Info,
        );

        // Step 5: image prompts, generation, storage transfer.
        self.state
            .set_stage(&format!("Step 5/6: Generating images ({image_model})..."), 70);
        let prompts = self
            .designer
            .image_prompts(&content, &strategy.title, image_model)
            .await?;
        let raw_urls = self.images.generate(&prompts, image_model).await;

        self.state.set_stage("Step 5/6: Storing images...", 75);
        let stored_urls = self.transfer_images(&raw_urls, &draft_id).await;

        self.store
            .update_draft(
                &draft_id,
                DraftPatch {
                    content: Some(content.clone()),
                    image_urls: Some(stored_urls.clone()),
                    image_prompts: Some(prompts),
                    image_model: Some(image_model),
                    marketing_strategy: Some(strategy.clone()),
                    analysis_report: Some(analysis),
                    ..DraftPatch::default()
                },
            )
            .await?;

        // Step 6: review gate.
        self.state.set_stage("Step 6/6: Reviewing...", 90);
        let verdict = self.controller.review(&content, &strategy).await?;
        self.state
            .log(&format!("Review score: {}", verdict.score), Severity::Info);
        let approved = verdict.status == ReviewStatus::Approved;
        self.store
            .update_draft(
                &draft_id,
                DraftPatch {
                    review: Some(verdict),
                    status: Some(DraftStatus::Reviewed),
                    ..DraftPatch::default()
                },
            )
            .await?;

        let outcome = if approved {
            self.handle_approved(&draft_id, &topic, &strategy, &content, &stored_urls)
                .await?
        } else {
            self.state.log("Review required", Severity::Warning);
            self.store
                .update_draft(&draft_id, DraftPatch::status(DraftStatus::ReviewRequired))
                .await?;
            self.notifier
                .notify(&format!("Review required: {}", strategy.title), Severity::Warning)
                .await;
            RunOutcome {
                status: RunStatus::Success,
                message: "Article requires review".to_string(),
                topic: Some(topic.clone()),
                draft_id: Some(draft_id.clone()),
            }
        };

        self.state.set_stage("Completed", 100);
        self.state.log("Pipeline completed", Severity::Success);
        Ok(outcome)
    }

    /// Approval branch: publish when auto-post is on, otherwise park the
    /// draft as approved. A publish failure degrades to `approved` and the
    /// run still reports success for the work done up to that point.
    async fn handle_approved(
        &self,
        draft_id: &str,
        topic: &str,
        strategy: &Strategy,
        content: &str,
        image_urls: &[String],
    ) -> Result<RunOutcome> {
        self.state.log("Article approved", Severity::Info);
        let settings = self.store.settings().await?;

        if !settings.auto_post_store {
            self.store
                .update_draft(draft_id, DraftPatch::status(DraftStatus::Approved))
                .await?;
            self.notifier
                .notify(
                    &format!("Success! Approved: {} (ready to post)", strategy.title),
                    Severity::Success,
                )
                .await;
            return Ok(RunOutcome::success(
                "Article approved (auto-post off)",
                Some(topic.to_string()),
                Some(draft_id.to_string()),
            ));
        }

        self.state.set_stage("Publishing...", 95);
        match self.publish_all(draft_id, strategy, content, image_urls).await {
            Ok(published) if !published.is_empty() => {
                let mut patch = DraftPatch::status(DraftStatus::Posted);
                for (target, id) in &published {
                    match *target {
                        "cms" => patch.cms_post_id = Some(id.clone()),
                        _ => patch.store_article_id = Some(id.clone()),
                    }
                }
                self.store.update_draft(draft_id, patch).await?;
                self.notifier
                    .notify(
                        &format!("Success! Posted: {}", strategy.title),
                        Severity::Success,
                    )
                    .await;
                Ok(RunOutcome::success(
                    format!("Article posted to {} target(s)", published.len()),
                    Some(topic.to_string()),
                    Some(draft_id.to_string()),
                ))
            }
            Ok(_) => {
                // Every target was an unconfigured no-op.
                self.store
                    .update_draft(draft_id, DraftPatch::status(DraftStatus::Approved))
                    .await?;
                self.notifier
                    .notify(
                        &format!("Success! Approved: {} (no publish target configured)", strategy.title),
                        Severity::Success,
                    )
                    .await;
                Ok(RunOutcome::success(
                    "Article approved (no publish target configured)",
                    Some(topic.to_string()),
                    Some(draft_id.to_string()),
                ))
            }
            Err(e) => {
                self.state
                    .log(&format!("Auto-post failed: {e:#}"), Severity::Error);
                self.store
                    .update_draft(draft_id, DraftPatch::status(DraftStatus::Approved))
                    .await?;
                self.notifier
                    .notify(&format!("Auto-post failed: {e:#}"), Severity::Error)
                    .await;
                Ok(RunOutcome::success(
                    "Article approved (auto-post failed)",
                    Some(topic.to_string()),
                    Some(draft_id.to_string()),
                ))
            }
        }
    }

    /// Attempt every configured publish target. Returns the (target, id)
    /// pairs that actually published. `Err` only when nothing published and
    /// at least one target failed.
    async fn publish_all(
        &self,
        draft_id: &str,
        strategy: &Strategy,
        content: &str,
        image_urls: &[String],
    ) -> Result<Vec<(&'static str, String)>> {
        let mut published = Vec::new();
        let mut first_error: Option<anyhow::Error> = None;

        for target in &self.publish_targets {
            match target.publish(draft_id, strategy, content, image_urls).await {
                Ok(Some(id)) => published.push((target.name(), id)),
                Ok(None) => {}
                Err(e) => {
                    self.state.log(
                        &format!("Publish target '{}' failed: {e:#}", target.name()),
                        Severity::Error,
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if published.is_empty() => Err(e),
            _ => Ok(published),
        }
    }

    /// Per-image storage transfer. Placeholder/mock refs pass through
    /// unchanged; any per-image failure falls back to the raw ref.
    async fn transfer_images(&self, raw_urls: &[String], draft_id: &str) -> Vec<String> {
        let mut stored = Vec::with_capacity(raw_urls.len());
        for (index, url) in raw_urls.iter().enumerate() {
            if is_placeholder(url) {
                stored.push(url.clone());
                continue;
            }
            match self.store_one_image(url, draft_id).await {
                Ok(stored_url) => {
                    self.state.log(
                        &format!("Image {} stored: {stored_url}", index + 1),
                        Severity::Info,
                    );
                    stored.push(stored_url);
                }
                Err(e) => {
                    self.state.log(
                        &format!("Failed to store image {index}: {e:#}"),
                        Severity::Error,
                    );
                    stored.push(url.clone());
                }
            }
        }
        stored
    }

    async fn store_one_image(&self, url: &str, draft_id: &str) -> Result<String> {
        let bytes = self.media.fetch_bytes(url).await?;
        let path = self
            .objects
            .make_filename(&format!("articles/{draft_id}"), "png");
        self.objects.put(bytes, &path, "image/png").await
    }

    /// Manual republish of a stored draft: reads the structured strategy
    /// straight off the draft record and runs the publish targets.
    pub async fn republish(&self, draft_id: &str) -> Result<String> {
        let draft: ArticleDraft = self
            .store
            .get_draft(draft_id)
            .await?
            .ok_or_else(|| anyhow!("draft {draft_id} not found"))?;
        let strategy = draft
            .marketing_strategy
            .ok_or_else(|| anyhow!("draft {draft_id} has no stored strategy"))?;

        let published = self
            .publish_all(draft_id, &strategy, &draft.content, &draft.image_urls)
            .await?;
        if published.is_empty() {
            bail!("no publish target configured");
        }

        let mut patch = DraftPatch::status(DraftStatus::Posted);
        for (target, id) in &published {
            match *target {
                "cms" => patch.cms_post_id = Some(id.clone()),
                _ => patch.store_article_id = Some(id.clone()),
            }
        }
        self.store.update_draft(draft_id, patch).await?;
        self.notifier
            .notify(
                &format!("Manual post success: {}", strategy.title),
                Severity::Success,
            )
            .await;

        let ids: Vec<String> = published.into_iter().map(|(_, id)| id).collect();
        Ok(ids.join(","))
    }
}

fn render_recent_context(recent: &[ArticleDraft]) -> Result<String> {
    let items: Vec<serde_json::Value> = recent
        .iter()
        .map(|draft| {
            serde_json::json!({
                "topic": draft.topic,
                "title": draft.marketing_strategy.as_ref().map(|s| s.title.clone()),
                "created_at": draft.created_at,
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}
