//! Login and per-user progress

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};
use golearn_progress::ProgressStore;
use std::sync::Arc;
use tracing::error;

use crate::error::{AppError, Result};
use crate::protocol::{LoginRequest, LoginResponse, OkResponse, ProgressResponse};
use crate::state::AppState;

type Store = Arc<dyn ProgressStore>;

/// Progress routes bound to `store`, ready to merge into the API router
pub fn routes(store: Store) -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/progress/{username}", get(get_progress).delete(reset_progress))
        .route("/progress/{username}/{lesson_id}", post(mark_progress))
        .with_state(store)
}

/// Trimmed username; blank names are rejected on every route
fn validate_username(raw: &str) -> Result<String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("username is required".to_string()));
    }
    Ok(username.to_string())
}

fn storage_error(message: &str, err: anyhow::Error) -> AppError {
    error!("{}: {:#}", message, err);
    AppError::Internal(message.to_string())
}

/// POST /api/login
pub async fn login(
    State(store): State<Store>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(request) =
        payload.map_err(|_| AppError::BadRequest("invalid request".to_string()))?;

    let username = validate_username(&request.username)?;

    store
        .ensure_user(&username)
        .await
        .map_err(|e| storage_error("failed to create user", e))?;
    let progress = store
        .get_progress(&username)
        .await
        .map_err(|e| storage_error("failed to get progress", e))?;

    Ok(Json(LoginResponse { username, progress }))
}

/// GET /api/progress/{username}
pub async fn get_progress(
    Path(raw): Path<String>,
    State(store): State<Store>,
) -> Result<Json<ProgressResponse>> {
    let username = validate_username(&raw)?;
    let progress = store
        .get_progress(&username)
        .await
        .map_err(|e| storage_error("failed to get progress", e))?;
    Ok(Json(ProgressResponse { progress }))
}

/// POST /api/progress/{username}/{lessonId}
pub async fn mark_progress(
    Path((raw, lesson_id)): Path<(String, String)>,
    State(store): State<Store>,
) -> Result<Json<OkResponse>> {
    let username = validate_username(&raw)?;
    store
        .mark_completed(&username, &lesson_id)
        .await
        .map_err(|e| storage_error("failed to save progress", e))?;
    Ok(Json(OkResponse::ok()))
}

/// DELETE /api/progress/{username}
pub async fn reset_progress(
    Path(raw): Path<String>,
    State(store): State<Store>,
) -> Result<Json<OkResponse>> {
    let username = validate_username(&raw)?;
    store
        .reset_progress(&username)
        .await
        .map_err(|e| storage_error("failed to reset progress", e))?;
    Ok(Json(OkResponse::ok()))
}
