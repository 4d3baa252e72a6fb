//! HTTP handlers: run triggers, progress polling, settings, and the article
//! review/publish surface.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use pressroom_common::{DraftPatch, DraftStatus, ImageModel, SystemSettings};

use crate::AppState;

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

fn err(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

/// Pick the image model: explicit request value wins, otherwise the stored
/// settings default.
async fn resolve_image_model(
    state: &AppState,
    requested: Option<&str>,
) -> Result<ImageModel, (StatusCode, Json<Value>)> {
    match requested {
        Some(raw) => raw
            .parse()
            .map_err(|e| err(StatusCode::BAD_REQUEST, format!("{e}"))),
        None => {
            let settings = state
                .store
                .settings()
                .await
                .unwrap_or_else(|_| SystemSettings::default());
            Ok(settings.default_image_model)
        }
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Parse an optional JSON body; an empty body means all defaults.
fn parse_body<T: serde::de::DeserializeOwned + Default>(
    body: &str,
) -> Result<T, (StatusCode, Json<Value>)> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(|e| err(StatusCode::BAD_REQUEST, e.to_string()))
}

#[derive(Deserialize, Default)]
pub struct RunRequest {
    image_model: Option<String>,
}

pub async fn start_run(State(state): State<Arc<AppState>>, body: String) -> ApiResult {
    let request: RunRequest = parse_body(&body)?;
    let image_model = resolve_image_model(&state, request.image_model.as_deref()).await?;

    if state.running.swap(true, Ordering::SeqCst) {
        return Err(err(StatusCode::CONFLICT, "a run is already in progress"));
    }

    let task_state = state.clone();
    tokio::spawn(async move {
        let outcome = task_state.pipeline.run(image_model, &[]).await;
        info!(status = ?outcome.status, message = %outcome.message, "Run finished");
        task_state.running.store(false, Ordering::SeqCst);
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "started": true, "image_model": image_model.as_str() })),
    ))
}

#[derive(Deserialize, Default)]
pub struct BatchRequest {
    count: Option<u32>,
    image_model: Option<String>,
}

pub async fn start_batch(State(state): State<Arc<AppState>>, body: String) -> ApiResult {
    let request: BatchRequest = parse_body(&body)?;
    let image_model = resolve_image_model(&state, request.image_model.as_deref()).await?;

    let count = match request.count {
        Some(0) => return Err(err(StatusCode::BAD_REQUEST, "count must be at least 1")),
        Some(n) => n,
        None => {
            state
                .store
                .settings()
                .await
                .unwrap_or_else(|_| SystemSettings::default())
                .articles_per_run
        }
    };

    if state.running.swap(true, Ordering::SeqCst) {
        return Err(err(StatusCode::CONFLICT, "a run is already in progress"));
    }

    let task_state = state.clone();
    tokio::spawn(async move {
        let outcomes = task_state.pipeline.run_batch(count, image_model).await;
        for (i, outcome) in outcomes.iter().enumerate() {
            info!(iteration = i + 1, status = ?outcome.status, message = %outcome.message, "Batch run finished");
        }
        task_state.running.store(false, Ordering::SeqCst);
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "started": true, "count": count, "image_model": image_model.as_str() })),
    ))
}

pub async fn progress(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.pipeline.run_state().snapshot();
    Json(json!({
        "running": state.running.load(Ordering::SeqCst),
        "stage": snapshot.stage,
        "progress": snapshot.progress,
        "logs": snapshot.logs,
    }))
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult {
    let settings = state
        .store
        .settings()
        .await
        .map_err(|e| err(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok((StatusCode::OK, Json(json!(settings))))
}

pub async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<SystemSettings>,
) -> ApiResult {
    state
        .store
        .save_settings(&settings)
        .await
        .map_err(|e| err(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok((StatusCode::OK, Json(json!(settings))))
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ListQuery {
    limit: Option<usize>,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult {
    let limit = query.limit.unwrap_or(20).min(100);
    let drafts = state
        .store
        .recent_drafts(limit)
        .await
        .map_err(|e| err(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok((StatusCode::OK, Json(json!(drafts))))
}

pub async fn article_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let draft = state
        .store
        .get_draft(&id)
        .await
        .map_err(|e| err(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| err(StatusCode::NOT_FOUND, format!("draft {id} not found")))?;
    Ok((StatusCode::OK, Json(json!(draft))))
}

pub async fn publish_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    match state.pipeline.republish(&id).await {
        Ok(posted_id) => Ok((StatusCode::OK, Json(json!({ "posted_id": posted_id })))),
        Err(e) => {
            error!(draft_id = %id, error = %e, "Manual publish failed");
            Err(err(StatusCode::BAD_GATEWAY, format!("{e:#}")))
        }
    }
}

#[derive(Deserialize)]
pub struct StatusRequest {
    status: DraftStatus,
}

/// Manual review action. The forward-only rule is enforced by the store, so
/// a regression comes back as a 409 here.
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> ApiResult {
    if state.store.get_draft(&id).await.ok().flatten().is_none() {
        return Err(err(StatusCode::NOT_FOUND, format!("draft {id} not found")));
    }
    state
        .store
        .update_draft(&id, DraftPatch::status(request.status))
        .await
        .map_err(|e| err(StatusCode::CONFLICT, e.to_string()))?;
    Ok((
        StatusCode::OK,
        Json(json!({ "id": id, "status": request.status })),
    ))
}
