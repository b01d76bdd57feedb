//! # Board handlers
//!
//! One handler per verb on `/api/threads/{board}` and `/api/replies/{board}`.
//! Each maps its request onto a single service call and answers with plain
//! text, a JSON view, or a redirect to the page showing the new post.

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use domains::{NewReply, NewThread, ThreadView};
use serde::Deserialize;

use super::extract::Payload;
use super::AppState;
use crate::error::{ApiError, ErrorKind};
use crate::operation::Operation;

const SUCCESS: &str = "success";

/// Every field any board endpoint reads. Absent fields are `None`; the
/// services decide which ones are required.
#[derive(Debug, Default, Deserialize)]
pub struct BoardForm {
    pub text: Option<String>,
    pub delete_password: Option<String>,
    pub thread_id: Option<String>,
    pub reply_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThreadQuery {
    pub thread_id: Option<String>,
}

/// POST /api/threads/{board} - Create a new thread.
pub async fn create_thread(
    State(state): State<AppState>,
    Path(board): Path<String>,
    payload: Result<Payload<BoardForm>, ApiError>,
) -> Result<Redirect, ApiError> {
    let form = state.payload(Operation::CreateThread, payload)?;
    let input = NewThread {
        board: board.clone(),
        text: form.text.unwrap_or_default(),
        delete_password: form.delete_password.unwrap_or_default(),
    };
    let result = state.threads.create_thread(input).await;
    state.finish(Operation::CreateThread, result)?;

    Ok(Redirect::to(&format!("/b/{}/", urlencoding::encode(&board))))
}

/// GET /api/threads/{board} - The board's most recently bumped threads.
pub async fn list_threads(
    State(state): State<AppState>,
    Path(board): Path<String>,
) -> Result<Json<Vec<ThreadView>>, ApiError> {
    let result = state.threads.list_threads(&board).await;
    let threads = state.finish(Operation::ListThreads, result)?;
    Ok(Json(threads))
}

/// PUT /api/threads/{board} - Report a thread.
pub async fn report_thread(
    State(state): State<AppState>,
    payload: Result<Payload<BoardForm>, ApiError>,
) -> Result<&'static str, ApiError> {
    let form = state.payload(Operation::ReportThread, payload)?;
    let thread_id = form.thread_id.unwrap_or_default();
    let result = state.threads.report_thread(&thread_id).await;
    state.finish(Operation::ReportThread, result)?;
    Ok(SUCCESS)
}

/// DELETE /api/threads/{board} - Delete a thread with its password.
pub async fn delete_thread(
    State(state): State<AppState>,
    payload: Result<Payload<BoardForm>, ApiError>,
) -> Result<&'static str, ApiError> {
    let form = state.payload(Operation::DeleteThread, payload)?;
    let thread_id = form.thread_id.unwrap_or_default();
    let password = form.delete_password.unwrap_or_default();
    let result = state.threads.delete_thread(&thread_id, &password).await;
    state.finish(Operation::DeleteThread, result)?;
    Ok(SUCCESS)
}

/// POST /api/replies/{board} - Reply to a thread.
pub async fn create_reply(
    State(state): State<AppState>,
    Path(board): Path<String>,
    payload: Result<Payload<BoardForm>, ApiError>,
) -> Result<Redirect, ApiError> {
    let form = state.payload(Operation::CreateReply, payload)?;
    let thread_id = form.thread_id.unwrap_or_default();
    let input = NewReply {
        board: board.clone(),
        thread_id: thread_id.clone(),
        text: form.text.unwrap_or_default(),
        delete_password: form.delete_password.unwrap_or_default(),
    };
    let result = state.replies.create_reply(input).await;
    state.finish(Operation::CreateReply, result)?;

    Ok(Redirect::to(&format!(
        "/b/{}/{}",
        urlencoding::encode(&board),
        urlencoding::encode(&thread_id)
    )))
}

/// GET /api/replies/{board}?thread_id= - A full thread with every reply.
pub async fn get_thread(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Query(query): Query<ThreadQuery>,
) -> Result<Json<ThreadView>, ApiError> {
    let thread_id = query.thread_id.unwrap_or_default();
    let result = state.replies.get_thread(&board, &thread_id).await;
    let thread = state.finish(Operation::GetThread, result)?;
    Ok(Json(thread))
}

/// PUT /api/replies/{board} - Report a reply.
pub async fn report_reply(
    State(state): State<AppState>,
    payload: Result<Payload<BoardForm>, ApiError>,
) -> Result<&'static str, ApiError> {
    let form = state.payload(Operation::ReportReply, payload)?;
    let thread_id = form.thread_id.unwrap_or_default();
    let reply_id = form.reply_id.unwrap_or_default();
    let result = state.replies.report_reply(&thread_id, &reply_id).await;
    state.finish(Operation::ReportReply, result)?;
    Ok(SUCCESS)
}

/// DELETE /api/replies/{board} - Soft-delete a reply with its password.
pub async fn delete_reply(
    State(state): State<AppState>,
    payload: Result<Payload<BoardForm>, ApiError>,
) -> Result<&'static str, ApiError> {
    let form = state.payload(Operation::DeleteReply, payload)?;
    let thread_id = form.thread_id.unwrap_or_default();
    let reply_id = form.reply_id.unwrap_or_default();
    let password = form.delete_password.unwrap_or_default();
    let result = state
        .replies
        .delete_reply(&thread_id, &reply_id, &password)
        .await;
    state.finish(Operation::DeleteReply, result)?;
    Ok(SUCCESS)
}

/// GET /metrics - OpenMetrics exposition of the operation counters.
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.encode().map_err(|e| {
        tracing::error!("Failed to encode metrics: {}", e);
        ApiError::new(ErrorKind::Internal, "Error encoding metrics")
    })?;

    Ok((
        [(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        body,
    ))
}
