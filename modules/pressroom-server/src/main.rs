use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::{gemini::Gemini, imageapi::ImageApi, ImageSynth, TextModel};
use pressroom_clients::{
    FsObjectStore, HeadlessClient, HttpAnalytics, HttpMediaFetcher, HttpObjectStore,
    JsonDraftStore, LogNotifier, RestCms, SlackNotifier, UnconfiguredAnalytics,
};
use pressroom_common::Config;
use pressroom_pipeline::traits::{
    AnalyticsProvider, DraftStore, MediaFetcher, Notifier, ObjectStore,
};
use pressroom_pipeline::{CmsTarget, HeadlessTarget, Pipeline, PipelineDeps, PublishTarget};

mod routes;

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub store: Arc<dyn DraftStore>,
    pub running: AtomicBool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pressroom=info".parse()?))
        .init();

    let config = Config::from_env();

    let store: Arc<dyn DraftStore> = Arc::new(JsonDraftStore::new(&config.data_dir));

    let analytics: Arc<dyn AnalyticsProvider> = match (
        &config.analytics_base_url,
        &config.analytics_property_id,
        &config.analytics_api_key,
    ) {
        (Some(base_url), Some(property_id), Some(api_key)) => Arc::new(HttpAnalytics::new(
            base_url.clone(),
            property_id.clone(),
            api_key.clone(),
        )),
        _ => {
            info!("Analytics not configured, runs will use empty snapshots");
            Arc::new(UnconfiguredAnalytics)
        }
    };

    let objects: Arc<dyn ObjectStore> = match &config.storage_base_url {
        Some(base_url) => Arc::new(HttpObjectStore::new(
            base_url.clone(),
            config.storage_bucket.clone(),
            config.storage_token.clone(),
        )),
        None => {
            info!("Object storage not configured, using local disk");
            Arc::new(FsObjectStore::new(format!("{}/objects", config.data_dir)))
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.slack_webhook_url {
        Some(url) => Arc::new(SlackNotifier::new(url.clone())),
        None => Arc::new(LogNotifier),
    };

    let text_model: Arc<dyn TextModel> =
        Arc::new(Gemini::new(&config.model_api_key, &config.text_model));
    let flat_images: Arc<dyn ImageSynth> = Arc::new(ImageApi::new(
        &config.image_api_base_url,
        &config.model_api_key,
        &config.flat_image_model,
    ));
    let infographic_images: Arc<dyn ImageSynth> = Arc::new(ImageApi::new(
        &config.image_api_base_url,
        &config.model_api_key,
        &config.infographic_image_model,
    ));

    let mut publish_targets: Vec<Arc<dyn PublishTarget>> = vec![Arc::new(CmsTarget::new(
        Arc::new(RestCms::new(
            config.cms_base_url.clone(),
            config.cms_username.clone(),
            config.cms_password.clone(),
        )),
    ))];
    if let (Some(base_url), Some(api_key)) = (&config.headless_base_url, &config.headless_api_key)
    {
        publish_targets.push(Arc::new(HeadlessTarget::new(Arc::new(
            HeadlessClient::new(
                base_url.clone(),
                api_key.clone(),
                config.headless_bucket.clone(),
            ),
        ))));
    }

    let pipeline = Pipeline::new(
        PipelineDeps::builder()
            .analytics(analytics)
            .store(store.clone())
            .objects(objects)
            .media(Arc::new(HttpMediaFetcher::new()) as Arc<dyn MediaFetcher>)
            .notifier(notifier)
            .text_model(text_model)
            .flat_images(flat_images)
            .infographic_images(infographic_images)
            .publish_targets(publish_targets)
            .build(),
    );

    let state = Arc::new(AppState {
        pipeline: Arc::new(pipeline),
        store,
        running: AtomicBool::new(false),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Pipeline runs
        .route("/run", post(routes::start_run))
        .route("/run/batch", post(routes::start_batch))
        .route("/progress", get(routes::progress))
        // Settings
        .route("/settings", get(routes::get_settings).put(routes::put_settings))
        // Articles
        .route("/articles", get(routes::list_articles))
        .route("/articles/{id}", get(routes::article_detail))
        .route("/articles/{id}/publish", post(routes::publish_article))
        .route("/articles/{id}/status", post(routes::set_status))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!(addr = %addr, "Pressroom server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
