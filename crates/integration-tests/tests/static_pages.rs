use axum::http::StatusCode;
use integration_tests::TestApp;

#[tokio::test]
async fn test_index_page() {
    let app = TestApp::new();
    let res = app.get("/").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.content_type.as_deref().unwrap().starts_with("text/html"));
    assert!(res.body.contains("anonboard"));
}

#[tokio::test]
async fn test_board_and_thread_pages() {
    let app = TestApp::new();

    let res = app.get("/b/general/").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("board.js"));

    for uri in ["/b/general/abc", "/b/general/abc/"] {
        let res = app.get(uri).await;
        assert_eq!(res.status, StatusCode::OK, "{uri}");
        assert!(res.body.contains("thread.js"), "{uri}");
    }
}

#[tokio::test]
async fn test_public_assets() {
    let app = TestApp::new();
    let res = app.get("/public/style.css").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.content_type.as_deref().unwrap().starts_with("text/css"));
}

#[tokio::test]
async fn test_unknown_path() {
    let app = TestApp::new();
    let res = app.get("/definitely/not/here").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, "Not Found");
}

#[tokio::test]
async fn test_security_headers_on_pages() {
    let app = TestApp::new();
    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        axum::http::Request::builder()
            .uri("/")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    assert_eq!(headers["x-dns-prefetch-control"], "off");
    assert_eq!(headers["referrer-policy"], "same-origin");
}
