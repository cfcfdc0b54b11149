//! End-to-end tests for the HTTP API, driven through the router in-process

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use golearn_core::{
    Catalog, CodeExecutor, ExecutionPolicy,
    sandbox::{ExecutionLimits, Toolchain},
};
use golearn_gateway::{AppState, routes::create_router};
use golearn_progress::{ProgressStore, SqliteProgressStore};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn sh_executor(root: &Path) -> CodeExecutor {
    CodeExecutor::new(ExecutionPolicy {
        toolchain: Toolchain {
            program: "sh".to_string(),
            args: vec![],
            source_file: "main.sh".to_string(),
            ..Default::default()
        },
        limits: ExecutionLimits {
            timeout_secs: 1,
            ..Default::default()
        },
        workspace_root: Some(root.to_path_buf()),
    })
}

fn app(root: &Path) -> Router {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    create_router(AppState::new(catalog, sh_executor(root)))
}

fn app_with_progress(root: &Path) -> Router {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let store: Arc<dyn ProgressStore> = Arc::new(SqliteProgressStore::open_in_memory().unwrap());
    create_router(AppState::new(catalog, sh_executor(root)).with_progress(store))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_list_chapters() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(&app(dir.path()), Method::GET, "/api/chapters", None).await;

    assert_eq!(status, StatusCode::OK);
    let chapters = body.as_array().unwrap();
    assert_eq!(chapters.len(), 10);
    assert_eq!(chapters[0]["id"], 1);
    assert_eq!(chapters[0]["lessons"][0]["id"], "1-1");
}

#[tokio::test]
async fn test_get_lesson() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, body) = send(&app, Method::GET, "/api/lessons/1-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "1-1");
    assert_eq!(body["chapterId"], 1);
    assert!(body["codeExamples"].as_array().is_some_and(|e| !e.is_empty()));

    let (status, body) = send(&app, Method::GET, "/api/lessons/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "lesson not found"}));
}

#[tokio::test]
async fn test_get_quiz() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, body) = send(&app, Method::GET, "/api/quiz/1-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lessonId"], "1-1");
    let question = &body["questions"][0];
    let options = question["options"].as_array().unwrap().len() as u64;
    assert!(question["answer"].as_u64().unwrap() < options);

    let (status, body) = send(&app, Method::GET, "/api/quiz/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "quiz not found");
}

#[tokio::test]
async fn test_run_rejects_empty_code() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    for code in ["", "   \n\t"] {
        let (status, body) =
            send(&app, Method::POST, "/api/run", Some(json!({ "code": code }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"output": "", "error": "code is empty"}));
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_run_rejects_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/run")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app(dir.path()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "invalid request");
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_success() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(
        &app(dir.path()),
        Method::POST,
        "/api/run",
        Some(json!({ "code": "echo hello" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"output": "hello\n"}));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_failure_keeps_output() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(
        &app(dir.path()),
        Method::POST,
        "/api/run",
        Some(json!({ "code": "echo oops >&2\nexit 2" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], "oops\n");
    assert_eq!(body["error"], "execution error");
    assert_eq!(body["status"], "failed");
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(
        &app(dir.path()),
        Method::POST,
        "/api/run",
        Some(json!({ "code": "echo started\nwhile true; do :; done" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "timeout");
    assert_eq!(body["error"], "execution timed out (1s)");
    assert_eq!(body["output"], "started\n");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_login_and_progress_flow() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_progress(dir.path());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "username": "  ana  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"username": "ana", "progress": []}));

    for _ in 0..2 {
        let (status, body) = send(&app, Method::POST, "/api/progress/ana/1-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }
    send(&app, Method::POST, "/api/progress/ana/1-2", None).await;

    let (status, body) = send(&app, Method::GET, "/api/progress/ana", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"progress": ["1-1", "1-2"]}));

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "username": "ana" })),
    )
    .await;
    assert_eq!(body["progress"], json!(["1-1", "1-2"]));

    let (status, body) = send(&app, Method::DELETE, "/api/progress/ana", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (_, body) = send(&app, Method::GET, "/api/progress/ana", None).await;
    assert_eq!(body, json!({"progress": []}));
}

#[tokio::test]
async fn test_login_rejects_blank_username() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_progress(dir.path());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "username": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_progress_routes_reject_blank_username() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_progress(dir.path());

    for (method, uri) in [
        (Method::POST, "/api/progress/%20%20/1-1"),
        (Method::GET, "/api/progress/%20%20"),
        (Method::DELETE, "/api/progress/%20%20"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, json!({"error": "username is required"}));
    }

    // Path usernames are trimmed the same way login trims them
    send(&app, Method::POST, "/api/progress/%20ana%20/1-1", None).await;
    let (_, body) = send(&app, Method::GET, "/api/progress/ana", None).await;
    assert_eq!(body, json!({"progress": ["1-1"]}));
}

#[tokio::test]
async fn test_progress_routes_absent_without_store() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, _) = send(&app, Method::GET, "/api/progress/ana", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "username": "ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_index() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/missing.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_header_present() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(dir.path())
        .oneshot(
            Request::builder()
                .uri("/api/chapters")
                .header(header::ORIGIN, "https://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
