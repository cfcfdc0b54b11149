//! REST API routes
//!
//! - `GET /api/chapters`
//! - `GET /api/lessons/{id}`
//! - `GET /api/quiz/{lessonId}`
//! - `POST /api/run`
//! - `POST /api/login`, `GET|DELETE /api/progress/{username}`,
//!   `POST /api/progress/{username}/{lessonId}` (only with a progress store)
//! - `GET /health`
//!
//! Any other path falls through to the embedded UI.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::assets;
use crate::state::AppState;

pub mod content;
pub mod progress;
pub mod run;

/// Assemble the full application router
pub fn create_router(state: AppState) -> Router {
    let mut api_routes = Router::new()
        .route("/chapters", get(content::list_chapters))
        .route("/lessons/{id}", get(content::get_lesson))
        .route("/quiz/{lesson_id}", get(content::get_quiz))
        .route("/run", post(run::run_code));

    if let Some(store) = state.progress.clone() {
        api_routes = api_routes.merge(progress::routes(store));
    }

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .fallback(assets::static_handler)
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health_check() -> &'static str {
    "OK"
}
