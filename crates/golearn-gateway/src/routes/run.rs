//! Code execution endpoint

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, error};

use crate::protocol::{RunRequest, RunResponse};
use crate::state::AppState;

/// POST /api/run
///
/// Answers 200 whenever the run could be classified, including timeouts and
/// programs that fail. Rejected input is 400, server-side faults are 500.
/// Code of any length is accepted unless `sandbox.limits.max_code_bytes` is
/// configured.
pub async fn run_code(
    State(state): State<AppState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> (StatusCode, Json<RunResponse>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            debug!("Rejected run request: {}", rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(RunResponse::rejected("invalid request")),
            );
        }
    };

    match state.executor.execute(&request.code).await {
        Ok(result) => (StatusCode::OK, Json(RunResponse::from(result))),
        Err(e) if e.is_validation() => (
            StatusCode::BAD_REQUEST,
            Json(RunResponse::rejected(e.to_string())),
        ),
        Err(e) => {
            error!("Code run failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RunResponse::rejected(e.to_string())),
            )
        }
    }
}
