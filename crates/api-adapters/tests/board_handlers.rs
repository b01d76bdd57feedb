use std::sync::Arc;

use api_adapters::web::{create_router, AppState, RouterConfig};
use auth_adapters::Argon2PasswordHasher;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use domains::ListingLimits;
use serde_json::Value;
use services::{ReplyService, ThreadService};
use storage_adapters::InMemoryThreadRepository;
use tower::ServiceExt;

fn app() -> Router {
    let repo = Arc::new(InMemoryThreadRepository::new());
    let hasher = Arc::new(Argon2PasswordHasher::new(1024, 1, 1).unwrap());
    let limits = ListingLimits::default();

    let replies = ReplyService::new(repo.clone(), hasher.clone(), &limits);
    let threads = ThreadService::new(repo, hasher, limits);
    create_router(AppState::new(threads, replies), &RouterConfig::default())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn form(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn first_thread_id(app: &Router, board: &str) -> String {
    let (status, body) = send(app, get(&format!("/api/threads/{board}"))).await;
    assert_eq!(status, StatusCode::OK);
    let threads: Value = serde_json::from_str(&body).unwrap();
    threads[0]["_id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_create_thread_redirects_to_board() {
    let app = app();
    let response = app
        .clone()
        .oneshot(form(
            "POST",
            "/api/threads/general",
            "text=hello&delete_password=pw",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/b/general/");
}

#[tokio::test]
async fn test_create_thread_missing_text() {
    let app = app();
    let (status, body) = send(
        &app,
        form("POST", "/api/threads/general", "delete_password=pw"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing parameter!");

    let (_, body) = send(&app, get("/api/threads/general")).await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_create_thread_accepts_json() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/threads/general")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"text":"from json","delete_password":"pw"}"#))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, body) = send(&app, get("/api/threads/general")).await;
    let threads: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(threads[0]["text"], "from json");
}

#[tokio::test]
async fn test_listing_hides_secrets() {
    let app = app();
    send(
        &app,
        form("POST", "/api/threads/general", "text=t&delete_password=pw"),
    )
    .await;
    let thread_id = first_thread_id(&app, "general").await;
    send(
        &app,
        form(
            "POST",
            "/api/replies/general",
            &format!("thread_id={thread_id}&text=r&delete_password=pw"),
        ),
    )
    .await;

    let (_, body) = send(&app, get("/api/threads/general")).await;
    let threads: Value = serde_json::from_str(&body).unwrap();
    let thread = threads[0].as_object().unwrap();

    assert!(thread.contains_key("_id"));
    assert!(thread.contains_key("created_on"));
    assert!(thread.contains_key("bumped_on"));
    assert!(!thread.contains_key("reported"));
    assert!(!thread.contains_key("delete_password"));
    assert_eq!(thread["replycount"], 1);

    let reply = thread["replies"][0].as_object().unwrap();
    assert_eq!(reply["text"], "r");
    assert!(!reply.contains_key("reported"));
    assert!(!reply.contains_key("delete_password"));
}

#[tokio::test]
async fn test_report_thread() {
    let app = app();
    send(
        &app,
        form("POST", "/api/threads/general", "text=t&delete_password=pw"),
    )
    .await;
    let thread_id = first_thread_id(&app, "general").await;

    let (status, body) = send(
        &app,
        form("PUT", "/api/threads/general", &format!("thread_id={thread_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "success");

    let (status, body) = send(&app, form("PUT", "/api/threads/general", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing thread_id");
}

#[tokio::test]
async fn test_delete_thread_checks_password() {
    let app = app();
    send(
        &app,
        form("POST", "/api/threads/general", "text=t&delete_password=pw"),
    )
    .await;
    let thread_id = first_thread_id(&app, "general").await;

    let (status, body) = send(
        &app,
        form(
            "DELETE",
            "/api/threads/general",
            &format!("thread_id={thread_id}&delete_password=wrong"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "incorrect password");

    let (status, body) = send(
        &app,
        form(
            "DELETE",
            "/api/threads/general",
            &format!("thread_id={thread_id}&delete_password=pw"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "success");

    let (_, body) = send(&app, get("/api/threads/general")).await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_delete_without_body_reads_query() {
    let app = app();
    let req = Request::builder()
        .method("DELETE")
        .uri("/api/threads/general")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing parameter");
}

#[tokio::test]
async fn test_unknown_thread_is_not_found() {
    let app = app();
    let (status, body) = send(&app, get("/api/replies/general?thread_id=nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "thread not found");

    let id = uuid::Uuid::now_v7();
    let (status, _) = send(
        &app,
        form("PUT", "/api/threads/general", &format!("thread_id={id}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reply_lifecycle() {
    let app = app();
    send(
        &app,
        form("POST", "/api/threads/general", "text=t&delete_password=pw"),
    )
    .await;
    let thread_id = first_thread_id(&app, "general").await;

    let response = app
        .clone()
        .oneshot(form(
            "POST",
            "/api/replies/general",
            &format!("thread_id={thread_id}&text=first&delete_password=rpw"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        format!("/b/general/{thread_id}").as_str()
    );

    let (status, body) = send(
        &app,
        get(&format!("/api/replies/general?thread_id={thread_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let thread: Value = serde_json::from_str(&body).unwrap();
    let reply_id = thread["replies"][0]["_id"].as_str().unwrap().to_owned();

    let (status, body) = send(
        &app,
        form(
            "PUT",
            "/api/replies/general",
            &format!("thread_id={thread_id}&reply_id={reply_id}"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "success");

    let (status, _) = send(
        &app,
        form(
            "DELETE",
            "/api/replies/general",
            &format!("thread_id={thread_id}&reply_id={reply_id}&delete_password=pw"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        form(
            "DELETE",
            "/api/replies/general",
            &format!("thread_id={thread_id}&reply_id={reply_id}&delete_password=rpw"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "success");

    let (_, body) = send(
        &app,
        get(&format!("/api/replies/general?thread_id={thread_id}")),
    )
    .await;
    let thread: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(thread["replies"][0]["text"], "[deleted]");
    assert_eq!(thread["replies"][0]["_id"], reply_id.as_str());
}

#[tokio::test]
async fn test_metrics_count_outcomes() {
    let app = app();
    send(
        &app,
        form("POST", "/api/threads/general", "delete_password=pw"),
    )
    .await;

    let (status, body) = send(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(
        r#"board_operations_total{operation="CreateThread",outcome="MissingParameter"} 1"#
    ));
}

#[tokio::test]
async fn test_malformed_body_is_counted() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/threads/general")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get("/metrics")).await;
    assert!(body.contains(
        r#"board_operations_total{operation="CreateThread",outcome="InvalidBody"} 1"#
    ));
    assert!(!body.contains(r#"outcome="Success""#));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = app();
    let (status, body) = send(&app, get("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Not Found");
}
