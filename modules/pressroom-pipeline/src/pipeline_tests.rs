//! End-to-end orchestrator tests over in-memory collaborators.
//!
//! Every run makes exactly five text-model calls in stage order:
//! analyst, marketer, writer, designer, controller.

use std::sync::Arc;

use ai_client::{ImageSynth, TextModel};
use pressroom_agents::testing::{FailOnTrigger, FixedImageSynth, ScriptedModel};
use pressroom_common::{
    ArticleDraft, DraftStatus, ImageModel, RunStatus, Severity, Strategy, SystemSettings,
    SECTION_MARKER,
};

use crate::pipeline::{Pipeline, PipelineDeps};
use crate::publish::{CmsTarget, HeadlessTarget, PublishTarget};
use crate::testing::{
    MemoryDraftStore, MockAnalytics, MockCms, MockHeadless, MockMediaFetcher, MockObjectStore,
    RecordingNotifier,
};
use crate::traits::{AnalyticsProvider, DraftStore, MediaFetcher, Notifier, ObjectStore};

fn analysis_json(topic: &str) -> String {
    format!(
        r#"{{"direction": "lean into quick dinners", "topic": "{topic}", "keywords": ["quick"]}}"#
    )
}

fn strategy_json(title: &str) -> String {
    format!(
        r#"{{"title": "{title}", "marketing_angle": "save weeknight time",
            "article_structure": ["hook", "how-to", "wrap-up"], "tone_guide": "friendly"}}"#
    )
}

fn article_text() -> String {
    format!("Intro paragraph.{SECTION_MARKER}Part two.{SECTION_MARKER}Part three.")
}

const PROMPTS_JSON: &str = r#"{"thumbnail_prompt": "thumb", "section1_prompt": "one",
    "section2_prompt": "two", "section3_prompt": "three"}"#;

fn verdict_json(status: &str, score: u8) -> String {
    format!(r#"{{"status": "{status}", "score": {score}, "comments": "ok"}}"#)
}

/// Queue the five replies of one successful run.
fn script_full_run(model: ScriptedModel, topic: &str, review_status: &str) -> ScriptedModel {
    model
        .reply(&analysis_json(topic))
        .reply(&strategy_json("Weeknight wins"))
        .reply(&article_text())
        .reply(PROMPTS_JSON)
        .reply(&verdict_json(review_status, 88))
}

struct Harness {
    store: Arc<MemoryDraftStore>,
    objects: Arc<MockObjectStore>,
    notifier: Arc<RecordingNotifier>,
    pipeline: Pipeline,
}

fn harness(
    model: ScriptedModel,
    store: MemoryDraftStore,
    targets: Vec<Arc<dyn PublishTarget>>,
) -> Harness {
    harness_with_images(
        model,
        store,
        targets,
        Arc::new(FixedImageSynth::new("https://img.test/gen.png")),
    )
}

fn harness_with_images(
    model: ScriptedModel,
    store: MemoryDraftStore,
    targets: Vec<Arc<dyn PublishTarget>>,
    flat_images: Arc<dyn ImageSynth>,
) -> Harness {
    let store = Arc::new(store);
    let objects = Arc::new(MockObjectStore::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let deps = PipelineDeps::builder()
        .analytics(Arc::new(MockAnalytics::new()) as Arc<dyn AnalyticsProvider>)
        .store(store.clone() as Arc<dyn DraftStore>)
        .objects(objects.clone() as Arc<dyn ObjectStore>)
        .media(Arc::new(MockMediaFetcher::new()) as Arc<dyn MediaFetcher>)
        .notifier(notifier.clone() as Arc<dyn Notifier>)
        .text_model(Arc::new(model) as Arc<dyn TextModel>)
        .flat_images(flat_images)
        .infographic_images(
            Arc::new(FixedImageSynth::new("https://img.test/info.png")) as Arc<dyn ImageSynth>,
        )
        .publish_targets(targets)
        .build();

    Harness {
        store,
        objects,
        notifier,
        pipeline: Pipeline::new(deps),
    }
}

fn auto_post_settings() -> SystemSettings {
    SystemSettings {
        auto_post_store: true,
        ..SystemSettings::default()
    }
}

#[tokio::test]
async fn full_run_reaches_approved_when_auto_post_off() {
    let model = script_full_run(ScriptedModel::new(), "weeknight tacos", "APPROVED");
    let h = harness(model, MemoryDraftStore::new(), vec![]);

    let outcome = h.pipeline.run(ImageModel::Flat, &[]).await;

    assert_eq!(outcome.status, RunStatus::Success);
    let draft_id = outcome.draft_id.unwrap();
    let draft = h.store.draft(&draft_id).unwrap();
    assert_eq!(draft.status, DraftStatus::Approved);
    assert_eq!(draft.review.as_ref().unwrap().score, 88);
    assert_eq!(draft.image_urls.len(), 4);
    assert!(draft
        .image_urls
        .iter()
        .all(|u| u.starts_with("https://objects.test/")));
    assert_eq!(h.objects.stored_paths().len(), 4);
    assert_eq!(h.notifier.count_of(Severity::Success), 1);

    let snapshot = h.pipeline.run_state().snapshot();
    assert_eq!(snapshot.progress, 100);
}

#[tokio::test]
async fn review_required_parks_the_draft() {
    let model = script_full_run(ScriptedModel::new(), "weeknight tacos", "REVIEW_REQUIRED");
    let h = harness(model, MemoryDraftStore::new(), vec![]);

    let outcome = h.pipeline.run(ImageModel::Flat, &[]).await;

    assert_eq!(outcome.status, RunStatus::Success);
    let draft = h.store.draft(&outcome.draft_id.unwrap()).unwrap();
    assert_eq!(draft.status, DraftStatus::ReviewRequired);
    assert_eq!(h.notifier.count_of(Severity::Warning), 1);
}

#[tokio::test]
async fn posted_run_records_cms_post_id() {
    let model = script_full_run(ScriptedModel::new(), "weeknight tacos", "APPROVED");
    let cms = Arc::new(MockCms::new());
    let h = harness(
        model,
        MemoryDraftStore::new().with_settings(auto_post_settings()),
        vec![Arc::new(CmsTarget::new(cms.clone()))],
    );

    let outcome = h.pipeline.run(ImageModel::Flat, &[]).await;

    assert_eq!(outcome.status, RunStatus::Success);
    let draft = h.store.draft(&outcome.draft_id.unwrap()).unwrap();
    assert_eq!(draft.status, DraftStatus::Posted);
    assert!(draft.cms_post_id.is_some());
    assert_eq!(cms.posts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn publish_failure_degrades_to_approved_with_one_error_notification() {
    let model = script_full_run(ScriptedModel::new(), "weeknight tacos", "APPROVED");
    let headless = Arc::new(MockHeadless::new().failing_insert());
    let h = harness(
        model,
        MemoryDraftStore::new().with_settings(auto_post_settings()),
        vec![Arc::new(HeadlessTarget::new(headless))],
    );

    let outcome = h.pipeline.run(ImageModel::Flat, &[]).await;

    // The run itself still succeeds; only the final hop failed.
    assert_eq!(outcome.status, RunStatus::Success);
    let draft = h.store.draft(&outcome.draft_id.unwrap()).unwrap();
    assert_eq!(draft.status, DraftStatus::Approved);
    assert_eq!(h.notifier.count_of(Severity::Error), 1);
}

#[tokio::test]
async fn unconfigured_target_leaves_draft_approved() {
    let model = script_full_run(ScriptedModel::new(), "weeknight tacos", "APPROVED");
    let h = harness(
        model,
        MemoryDraftStore::new().with_settings(auto_post_settings()),
        vec![Arc::new(CmsTarget::new(Arc::new(MockCms::unconfigured())))],
    );

    let outcome = h.pipeline.run(ImageModel::Flat, &[]).await;

    assert_eq!(outcome.status, RunStatus::Success);
    let draft = h.store.draft(&outcome.draft_id.unwrap()).unwrap();
    assert_eq!(draft.status, DraftStatus::Approved);
    assert!(draft.cms_post_id.is_none());
    assert_eq!(h.notifier.count_of(Severity::Error), 0);
}

#[tokio::test]
async fn duplicate_topic_skips_before_draft_creation() {
    let existing = ArticleDraft::new(
        "draft-seed".to_string(),
        "report-seed".to_string(),
        "weeknight tacos".to_string(),
    );
    let store = MemoryDraftStore::new().with_draft(existing);
    // Only the analyst ever runs on a skip.
    let model = ScriptedModel::new().reply(&analysis_json("weeknight tacos"));
    let h = harness(model, store, vec![]);

    let outcome = h.pipeline.run(ImageModel::Flat, &[]).await;

    assert_eq!(outcome.status, RunStatus::Skipped);
    assert_eq!(outcome.topic.as_deref(), Some("weeknight tacos"));
    assert_eq!(h.store.draft_count(), 1);
    assert_eq!(h.notifier.count_of(Severity::Warning), 1);
}

#[tokio::test]
async fn batch_with_repeating_topic_yields_one_draft() {
    // Run 1 completes; runs 2 and 3 pick the same topic and are skipped by
    // the guard after only their analyst call.
    let model = script_full_run(ScriptedModel::new(), "weeknight tacos", "APPROVED")
        .reply(&analysis_json("weeknight tacos"))
        .reply(&analysis_json("weeknight tacos"));
    let h = harness(model, MemoryDraftStore::new(), vec![]);

    let outcomes = h.pipeline.run_batch(3, ImageModel::Flat).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].status, RunStatus::Success);
    assert_eq!(outcomes[1].status, RunStatus::Skipped);
    assert_eq!(outcomes[2].status, RunStatus::Skipped);
    assert_eq!(h.store.draft_count(), 1);
}

#[tokio::test]
async fn placeholder_image_passes_through_untouched() {
    let model = script_full_run(ScriptedModel::new(), "weeknight tacos", "APPROVED");
    // Section-2 prompt ("two") fails at the image backend and becomes a
    // placeholder; the transfer step must not try to re-host it.
    let flat = Arc::new(FailOnTrigger::new("two", "https://img.test/ok.png"));
    let h = harness_with_images(model, MemoryDraftStore::new(), vec![], flat);

    let outcome = h.pipeline.run(ImageModel::Flat, &[]).await;

    let draft = h.store.draft(&outcome.draft_id.unwrap()).unwrap();
    assert_eq!(draft.image_urls.len(), 4);
    assert!(draft.image_urls[2].contains("generation-failed"));
    assert!(draft.image_urls[0].starts_with("https://objects.test/"));
    assert_eq!(h.objects.stored_paths().len(), 3);
}

#[tokio::test]
async fn model_failure_yields_error_outcome_and_notification() {
    // Analyst and marketer succeed, the writer's backend call fails.
    let model = ScriptedModel::new()
        .reply(&analysis_json("weeknight tacos"))
        .reply(&strategy_json("Weeknight wins"))
        .fail("quota exceeded");
    let h = harness(model, MemoryDraftStore::new(), vec![]);

    let outcome = h.pipeline.run(ImageModel::Flat, &[]).await;

    assert_eq!(outcome.status, RunStatus::Error);
    assert!(outcome.message.contains("quota exceeded"));
    assert_eq!(h.notifier.count_of(Severity::Error), 1);
}

#[tokio::test]
async fn republish_posts_a_stored_draft() {
    let mut draft = ArticleDraft::new(
        "draft-seed".to_string(),
        "report-seed".to_string(),
        "weeknight tacos".to_string(),
    );
    draft.status = DraftStatus::Approved;
    draft.content = article_text();
    draft.image_urls = vec![
        "https://objects.test/a.png".to_string(),
        "https://objects.test/b.png".to_string(),
        "https://objects.test/c.png".to_string(),
        "https://objects.test/d.png".to_string(),
    ];
    draft.marketing_strategy = Some(Strategy {
        title: "Weeknight wins".to_string(),
        marketing_angle: "save weeknight time".to_string(),
        article_structure: vec!["hook".to_string()],
        tone_guide: String::new(),
    });
    let store = MemoryDraftStore::new().with_draft(draft);

    let headless = Arc::new(MockHeadless::new());
    let h = harness(
        ScriptedModel::new(),
        store,
        vec![Arc::new(HeadlessTarget::new(headless.clone()))],
    );

    let id = h.pipeline.republish("draft-seed").await.unwrap();
    assert!(!id.is_empty());

    let draft = h.store.draft("draft-seed").unwrap();
    assert_eq!(draft.status, DraftStatus::Posted);
    assert!(draft.store_article_id.is_some());
    assert_eq!(headless.articles.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn republish_without_strategy_is_an_error() {
    let draft = ArticleDraft::new(
        "draft-bare".to_string(),
        "report-seed".to_string(),
        "weeknight tacos".to_string(),
    );
    let store = MemoryDraftStore::new().with_draft(draft);
    let h = harness(
        ScriptedModel::new(),
        store,
        vec![Arc::new(HeadlessTarget::new(Arc::new(MockHeadless::new())))],
    );

    assert!(h.pipeline.republish("draft-bare").await.is_err());
}
