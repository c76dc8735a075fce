//! HTTP surface: ingest callbacks and public read endpoints
//!
//! The ingest server drives the lifecycle through the `/callbacks` routes;
//! everything under `/api/v1` serves the platform's own clients.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::services::StreamService;

pub mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub stream_service: Arc<StreamService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/streams", post(handlers::create_stream))
        .route("/api/v1/streams/active", get(handlers::list_active_streams))
        .route(
            "/api/v1/users/broadcasting",
            get(handlers::list_broadcasting_users),
        )
        .route(
            "/api/v1/users/{user_id}/streams",
            get(handlers::list_user_history),
        )
        .route("/callbacks/publish", post(handlers::publish))
        .route("/callbacks/publish_done", post(handlers::publish_done))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::OperationInProgress { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Ingest { .. } => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Configuration { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
