//! Shared fixtures for the workspace integration tests.
//!
//! Everything runs in-process against the in-memory store with a cheap
//! Argon2 configuration, so tests need no database and stay fast.

use std::path::PathBuf;
use std::sync::Arc;

use auth_adapters::Argon2PasswordHasher;
use domains::ListingLimits;
use services::{ReplyService, ThreadService};
use storage_adapters::InMemoryThreadRepository;

/// Argon2 parameters small enough for tests.
pub fn fast_hasher() -> Arc<Argon2PasswordHasher> {
    Arc::new(Argon2PasswordHasher::new(1024, 1, 1).expect("valid argon2 params"))
}

/// Both services over one shared in-memory store.
pub fn wire_services(
    repo: Arc<InMemoryThreadRepository>,
    limits: ListingLimits,
) -> (ThreadService, ReplyService) {
    let hasher = fast_hasher();
    let replies = ReplyService::new(repo.clone(), hasher.clone(), &limits);
    let threads = ThreadService::new(repo, hasher, limits);
    (threads, replies)
}

/// The checkout root, where `views/` and `public/` live.
pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

#[cfg(feature = "web-axum")]
pub use web::{TestApp, TestResponse};

#[cfg(feature = "web-axum")]
mod web {
    use std::sync::Arc;

    use api_adapters::web::{create_router, AppState, RouterConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use domains::ListingLimits;
    use serde_json::Value;
    use storage_adapters::InMemoryThreadRepository;
    use tower::ServiceExt;

    use super::{wire_services, workspace_root};

    pub struct TestResponse {
        pub status: StatusCode,
        pub location: Option<String>,
        pub content_type: Option<String>,
        pub body: String,
    }

    impl TestResponse {
        pub fn json(&self) -> Value {
            serde_json::from_str(&self.body).expect("response body is JSON")
        }
    }

    /// The full router plus a handle on its store.
    pub struct TestApp {
        pub router: Router,
        pub repo: Arc<InMemoryThreadRepository>,
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestApp {
        pub fn new() -> Self {
            Self::with_limits(ListingLimits::default())
        }

        pub fn with_limits(limits: ListingLimits) -> Self {
            let repo = Arc::new(InMemoryThreadRepository::new());
            let (threads, replies) = wire_services(repo.clone(), limits);
            let root = workspace_root();
            let config = RouterConfig {
                views_dir: root.join("views"),
                public_dir: root.join("public"),
                cors_any_origin: true,
            };
            let router = create_router(AppState::new(threads, replies), &config);
            Self { router, repo }
        }

        pub async fn send(&self, req: Request<Body>) -> TestResponse {
            let response = self.router.clone().oneshot(req).await.expect("infallible");
            let header_string = |name: header::HeaderName| {
                response
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned)
            };
            let status = response.status();
            let location = header_string(header::LOCATION);
            let content_type = header_string(header::CONTENT_TYPE);
            let body = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("readable body");
            TestResponse {
                status,
                location,
                content_type,
                body: String::from_utf8_lossy(&body).into_owned(),
            }
        }

        pub async fn get(&self, uri: &str) -> TestResponse {
            self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
        }

        /// Sends `pairs` as a urlencoded form body.
        pub async fn form(&self, method: &str, uri: &str, pairs: &[(&str, &str)]) -> TestResponse {
            let body = pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            self.send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
        }

        /// Sends `value` as a JSON body.
        pub async fn json(&self, method: &str, uri: &str, value: Value) -> TestResponse {
            self.send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(value.to_string()))
                    .unwrap(),
            )
            .await
        }

        /// Posts a thread and returns its id, read back from the listing.
        pub async fn create_thread(&self, board: &str, text: &str, password: &str) -> String {
            let res = self
                .form(
                    "POST",
                    &format!("/api/threads/{board}"),
                    &[("text", text), ("delete_password", password)],
                )
                .await;
            assert_eq!(res.status, StatusCode::SEE_OTHER, "{}", res.body);

            let listing = self.list_threads(board).await;
            listing
                .as_array()
                .and_then(|threads| threads.iter().find(|t| t["text"] == text))
                .and_then(|t| t["_id"].as_str())
                .expect("new thread is listed")
                .to_owned()
        }

        /// Posts a reply and returns its id.
        pub async fn create_reply(
            &self,
            board: &str,
            thread_id: &str,
            text: &str,
            password: &str,
        ) -> String {
            let res = self
                .form(
                    "POST",
                    &format!("/api/replies/{board}"),
                    &[
                        ("thread_id", thread_id),
                        ("text", text),
                        ("delete_password", password),
                    ],
                )
                .await;
            assert_eq!(res.status, StatusCode::SEE_OTHER, "{}", res.body);

            let thread = self.thread(board, thread_id).await;
            thread["replies"]
                .as_array()
                .and_then(|replies| replies.last())
                .and_then(|r| r["_id"].as_str())
                .expect("new reply is the last one")
                .to_owned()
        }

        pub async fn list_threads(&self, board: &str) -> Value {
            let res = self.get(&format!("/api/threads/{board}")).await;
            assert_eq!(res.status, StatusCode::OK, "{}", res.body);
            res.json()
        }

        pub async fn thread(&self, board: &str, thread_id: &str) -> Value {
            let res = self
                .get(&format!("/api/replies/{board}?thread_id={thread_id}"))
                .await;
            assert_eq!(res.status, StatusCode::OK, "{}", res.body);
            res.json()
        }
    }
}
