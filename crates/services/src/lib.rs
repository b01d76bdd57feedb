//! # services
//!
//! Use-cases for the board. Each public method validates its input, performs
//! at most one password check, then exactly one store operation.

mod input;
pub mod reply_service;
pub mod thread_service;

pub use reply_service::ReplyService;
pub use thread_service::ThreadService;

use std::sync::Arc;

use domains::{BoardError, PasswordHasher, Result, ThreadRepository, ThreadView};

/// Loads a full thread for display. Shared by the threads and replies routes.
pub(crate) async fn fetch_thread(
    repo: &Arc<dyn ThreadRepository>,
    board: &str,
    thread_id: &str,
) -> Result<ThreadView> {
    input::require(board, "board")?;
    let id = input::parse_id(thread_id, "thread_id", "thread")?;

    let thread = repo
        .find(id)
        .await?
        .ok_or_else(|| BoardError::thread_not_found(thread_id))?;

    Ok(ThreadView::from(thread))
}

/// Hashes a delete password, folding hasher failures into `Hashing`.
pub(crate) async fn hash_password(
    hasher: &Arc<dyn PasswordHasher>,
    password: &str,
) -> Result<String> {
    hasher
        .hash(password)
        .await
        .map_err(|e| BoardError::Hashing(e.to_string()))
}

/// Fails with `PasswordMismatch` unless `candidate` matches `hash`.
pub(crate) async fn check_password(
    hasher: &Arc<dyn PasswordHasher>,
    candidate: &str,
    hash: &str,
) -> Result<()> {
    let matches = hasher
        .verify(candidate, hash)
        .await
        .map_err(|e| BoardError::Hashing(e.to_string()))?;

    if matches {
        Ok(())
    } else {
        Err(BoardError::PasswordMismatch)
    }
}
