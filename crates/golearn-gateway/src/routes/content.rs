//! Catalog lookups

use axum::{
    extract::{Path, State},
    response::Json,
};
use golearn_core::{Chapter, Lesson, Quiz};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// GET /api/chapters
pub async fn list_chapters(State(state): State<AppState>) -> Json<Vec<Chapter>> {
    Json(state.catalog.list_chapters().to_vec())
}

/// GET /api/lessons/{id}
pub async fn get_lesson(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Lesson>> {
    state.catalog.get_lesson(&id).cloned().map(Json).ok_or_else(|| {
        debug!("Lesson {} not found", id);
        AppError::NotFound("lesson not found".to_string())
    })
}

/// GET /api/quiz/{lessonId}
pub async fn get_quiz(
    Path(lesson_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Quiz>> {
    state
        .catalog
        .get_quiz(&lesson_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("quiz not found".to_string()))
}
