//! # Web (axum)
//!
//! Routing, extraction and response rendering for the board API, plus the
//! static pages the board front-end is served from.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use services::{ReplyService, ThreadService};
use tower_http::services::{ServeDir, ServeFile};

use crate::error::ApiError;
use crate::metrics::{ApiMetrics, Outcome};
use crate::operation::Operation;
use extract::Payload;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub threads: Arc<ThreadService>,
    pub replies: Arc<ReplyService>,
    pub metrics: Arc<ApiMetrics>,
}

impl AppState {
    pub fn new(threads: ThreadService, replies: ReplyService) -> Self {
        Self {
            threads: Arc::new(threads),
            replies: Arc::new(replies),
            metrics: Arc::new(ApiMetrics::new()),
        }
    }

    /// Records the outcome of `op` and converts failures for the wire.
    pub(crate) fn finish<T>(&self, op: Operation, result: domains::Result<T>) -> Result<T, ApiError> {
        let outcome = match &result {
            Ok(_) => Outcome::Success,
            Err(e) => Outcome::from(e),
        };
        self.metrics.record(op, outcome);
        result.map_err(|e| ApiError::from_board_error(op, e))
    }

    /// Unwraps an extracted body, counting a rejected one against `op`.
    pub(crate) fn payload<T>(
        &self,
        op: Operation,
        payload: Result<Payload<T>, ApiError>,
    ) -> Result<T, ApiError> {
        match payload {
            Ok(Payload(value)) => Ok(value),
            Err(e) => {
                self.metrics.record(op, Outcome::InvalidBody);
                Err(e)
            }
        }
    }
}

/// Where the static front-end lives and how permissive CORS is.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub views_dir: PathBuf,
    pub public_dir: PathBuf,
    pub cors_any_origin: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            views_dir: PathBuf::from("views"),
            public_dir: PathBuf::from("public"),
            cors_any_origin: true,
        }
    }
}

/// Create the main router.
pub fn create_router(state: AppState, config: &RouterConfig) -> Router {
    let api_routes = Router::new()
        .route(
            "/threads/{board}",
            get(handlers::list_threads)
                .post(handlers::create_thread)
                .put(handlers::report_thread)
                .delete(handlers::delete_thread),
        )
        .route(
            "/replies/{board}",
            get(handlers::get_thread)
                .post(handlers::create_reply)
                .put(handlers::report_reply)
                .delete(handlers::delete_reply),
        );

    let board_page = ServeFile::new(config.views_dir.join("board.html"));
    let thread_page = ServeFile::new(config.views_dir.join("thread.html"));

    let router = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics))
        .route_service("/", ServeFile::new(config.views_dir.join("index.html")))
        .route_service("/b/{board}/", board_page)
        .route_service("/b/{board}/{thread_id}", thread_page.clone())
        .route_service("/b/{board}/{thread_id}/", thread_page)
        .nest_service("/public", ServeDir::new(&config.public_dir))
        .fallback(not_found);

    middleware::apply(router, config.cors_any_origin).with_state(state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
