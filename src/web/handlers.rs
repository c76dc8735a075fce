//! Request handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::AppState;
use crate::errors::AppError;
use crate::models::{ActiveStreamEntry, FinishedStreamEntry, Stream, StreamCreateRequest};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct CreateStreamBody {
    pub user_id: Uuid,
    pub stream_key: String,
    pub title: String,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

pub async fn create_stream(
    State(state): State<AppState>,
    Json(body): Json<CreateStreamBody>,
) -> Result<(StatusCode, Json<Stream>), AppError> {
    let request = StreamCreateRequest {
        user_id: body.user_id,
        stream_key: body.stream_key,
        title: body.title,
        preview: body.preview,
    };
    let stream = state
        .stream_service
        .create_stream(request, &body.tag_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(stream)))
}

pub async fn list_active_streams(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActiveStreamEntry>>, AppError> {
    Ok(Json(state.stream_service.list_active_streams().await?))
}

pub async fn list_user_history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<FinishedStreamEntry>>, AppError> {
    Ok(Json(state.stream_service.list_user_history(user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct BroadcastingUsersQuery {
    #[serde(default = "default_user_limit")]
    pub limit: u64,
}

fn default_user_limit() -> u64 {
    20
}

pub async fn list_broadcasting_users(
    State(state): State<AppState>,
    Query(query): Query<BroadcastingUsersQuery>,
) -> Result<Json<Vec<Uuid>>, AppError> {
    Ok(Json(
        state
            .stream_service
            .list_broadcasting_users(query.limit)
            .await?,
    ))
}

/// Publish hook fired by the ingest server once a client starts pushing
/// media. A non-2xx response tells the ingest server to reject the publish.
#[derive(Debug, Deserialize)]
pub struct PublishCallback {
    pub stream_key: String,
    pub broadcast_id: String,
}

pub async fn publish(
    State(state): State<AppState>,
    Json(body): Json<PublishCallback>,
) -> Result<Json<Stream>, AppError> {
    let stream = state
        .stream_service
        .start_stream_by_key(&body.broadcast_id, &body.stream_key)
        .await?;
    Ok(Json(stream))
}

/// End-of-broadcast hook. Duplicate deliveries are expected and harmless.
#[derive(Debug, Deserialize)]
pub struct PublishDoneCallback {
    pub broadcast_id: String,
    pub path: String,
}

pub async fn publish_done(
    State(state): State<AppState>,
    Json(body): Json<PublishDoneCallback>,
) -> Result<Json<Value>, AppError> {
    let closed = state
        .stream_service
        .end_stream(&body.broadcast_id, &body.path)
        .await?;
    Ok(Json(json!({ "closed": closed })))
}
