//! HTTP surface tests driven through the router with `tower::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

use textpad::{
    application::{
        pad::PadService,
        refresh::RefreshLoop,
        repos::{BurnRepo, PagesRepo},
    },
    cache::{PadCache, WriteQueue},
    infra::{
        db::SqliteRepositories,
        http::{HttpState, build_router},
    },
};

struct Harness {
    dir: TempDir,
    router: axum::Router,
    refresh: RefreshLoop,
}

async fn harness() -> Harness {
    let dir = TempDir::new().expect("tempdir");
    let db_path = dir.path().join("content.db");
    let pool = SqliteRepositories::connect(&db_path, 2).await.expect("connect");
    SqliteRepositories::init_schema(&pool).await.expect("schema");
    let repos = Arc::new(SqliteRepositories::new(pool));

    let cache = Arc::new(PadCache::new());
    let queue = Arc::new(WriteQueue::new());
    let pages: Arc<dyn PagesRepo> = repos.clone();
    let burns: Arc<dyn BurnRepo> = repos.clone();

    let pad = Arc::new(PadService::new(cache.clone(), queue, pages.clone(), burns.clone()));
    let refresh = RefreshLoop::new(
        cache,
        pages,
        burns,
        dir.path().join("settings.txt"),
        dir.path().join("main.txt"),
        Duration::from_secs(10),
    );

    let state = HttpState {
        pad,
        meta_dir: dir.path().join("meta"),
        favicon_file: dir.path().join("favicon.ico"),
    };

    Harness {
        dir,
        router: build_router(state),
        refresh,
    }
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_string(response).await).expect("json")
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request")
}

fn post_json(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn post_empty(path: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn blank_pad_renders_as_editable_page() {
    let h = harness().await;

    let response = h.router.clone().oneshot(get("/abc123")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("<textarea"));
    assert!(!body.contains("readonly"));
}

#[tokio::test]
async fn update_then_read_round_trips() {
    let h = harness().await;

    let response = h
        .router
        .clone()
        .oneshot(post_json("/update/abc123", r#"{"content":"from the wire"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");

    let response = h.router.clone().oneshot(get("/abc123")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("from the wire"));
}

#[tokio::test]
async fn invalid_pad_id_is_rejected_with_json_error() {
    let h = harness().await;

    let response = h
        .router
        .clone()
        .oneshot(post_json("/update/no", r#"{"content":"x"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn malformed_body_is_a_json_bad_request() {
    let h = harness().await;

    let response = h
        .router
        .clone()
        .oneshot(post_json("/update/abc123", "not json at all"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn reserved_ids_serve_the_read_only_main_page() {
    let h = harness().await;

    tokio::fs::write(h.dir.path().join("main.txt"), "house rules")
        .await
        .expect("write main text");
    h.refresh.refresh_once().await.expect("refresh");

    for path in ["/", "/main", "/index", "/0", "/1"] {
        let response = h.router.clone().oneshot(get(path)).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK, "path {path}");
        let body = body_string(response).await;
        assert!(body.contains("house rules"), "path {path}");
        assert!(body.contains("readonly"), "path {path}");
    }

    // Reserved ids cannot be written.
    let response = h
        .router
        .clone()
        .oneshot(post_json("/update/main", r#"{"content":"x"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn maintenance_mode_blocks_updates_via_http() {
    let h = harness().await;

    tokio::fs::write(h.dir.path().join("settings.txt"), "construction = true\n")
        .await
        .expect("write settings");
    h.refresh.refresh_once().await.expect("refresh");

    let response = h
        .router
        .clone()
        .oneshot(post_json("/update/abc123", r#"{"content":"x"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Reads still work, rendered read-only.
    let response = h.router.clone().oneshot(get("/abc123")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("readonly"));
}

#[tokio::test]
async fn share_lifecycle_over_http() {
    let h = harness().await;

    h.router
        .clone()
        .oneshot(post_json("/update/abc123", r#"{"content":"shared text"}"#))
        .await
        .expect("update");

    let response = h
        .router
        .clone()
        .oneshot(post_empty("/create_share/abc123"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    let share_url = body["share_url"].as_str().expect("share_url").to_string();
    assert!(share_url.starts_with("/share/"));

    let response = h.router.clone().oneshot(get(&share_url)).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("shared text"));
    assert!(body.contains("readonly"));
}

#[tokio::test]
async fn burn_link_is_gone_after_first_read() {
    let h = harness().await;

    h.router
        .clone()
        .oneshot(post_json("/update/abc123", r#"{"content":"burn me"}"#))
        .await
        .expect("update");

    let response = h
        .router
        .clone()
        .oneshot(post_empty("/create_burn/abc123"))
        .await
        .expect("response");
    let body = body_json(response).await;
    let burn_url = body["burn_url"].as_str().expect("burn_url").to_string();

    let response = h.router.clone().oneshot(get(&burn_url)).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("burn me"));

    // Give the spawned retirement a chance to land.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = h.router.clone().oneshot(get(&burn_url)).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_token_is_a_bad_request() {
    let h = harness().await;

    let response = h
        .router
        .clone()
        .oneshot(get("/share/not-a-token"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = h
        .router
        .clone()
        .oneshot(get("/burn/zzzz"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let h = harness().await;

    let response = h
        .router
        .clone()
        .oneshot(get("/share/0123456789abcdef"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn meta_assets_are_served_with_content_type() {
    let h = harness().await;

    let meta_dir = h.dir.path().join("meta");
    tokio::fs::create_dir_all(&meta_dir).await.expect("mkdir");
    tokio::fs::write(meta_dir.join("style.css"), "body { color: red }")
        .await
        .expect("write asset");

    let response = h
        .router
        .clone()
        .oneshot(get("/meta/style.css"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("text/css"));

    // Traversal attempts never leave the asset directory.
    let response = h
        .router
        .clone()
        .oneshot(get("/meta/../settings.txt"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_favicon_is_no_content() {
    let h = harness().await;

    let response = h
        .router
        .clone()
        .oneshot(get("/favicon.ico"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unmatched_routes_fall_back_to_not_found() {
    let h = harness().await;

    let response = h
        .router
        .clone()
        .oneshot(get("/abc123/extra/segments"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
