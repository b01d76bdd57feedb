//! # ThreadService
//!
//! Creation, listing, retrieval, reporting and deletion of threads.

use std::sync::Arc;

use domains::{
    BoardError, ListingLimits, NewThread, PasswordHasher, Result, Thread, ThreadRepository,
    ThreadView,
};
use uuid::Uuid;

use crate::input::{parse_id, require};

pub struct ThreadService {
    repo: Arc<dyn ThreadRepository>,
    hasher: Arc<dyn PasswordHasher>,
    limits: ListingLimits,
}

impl ThreadService {
    pub fn new(
        repo: Arc<dyn ThreadRepository>,
        hasher: Arc<dyn PasswordHasher>,
        limits: ListingLimits,
    ) -> Self {
        Self {
            repo,
            hasher,
            limits,
        }
    }

    /// Creates a thread and returns its id.
    pub async fn create_thread(&self, input: NewThread) -> Result<Uuid> {
        require(&input.board, "board")?;
        require(&input.text, "text")?;
        require(&input.delete_password, "delete_password")?;

        let hash = crate::hash_password(&self.hasher, &input.delete_password).await?;
        let thread = Thread::new(input.board, input.text, hash);
        let id = thread.id;

        self.repo.insert(thread).await?;
        tracing::info!(thread_id = %id, "thread created");
        Ok(id)
    }

    /// The board's most recently bumped threads with a short reply preview.
    pub async fn list_threads(&self, board: &str) -> Result<Vec<ThreadView>> {
        require(board, "board")?;

        let previews = self
            .repo
            .list_recent(board, self.limits.thread_limit, self.limits.reply_preview)
            .await?;

        tracing::debug!(board, count = previews.len(), "threads listed");
        Ok(previews.into_iter().map(ThreadView::from).collect())
    }

    /// A single thread with every reply.
    pub async fn get_thread(&self, board: &str, thread_id: &str) -> Result<ThreadView> {
        crate::fetch_thread(&self.repo, board, thread_id).await
    }

    /// Flags a thread for moderation. Reporting twice is a no-op.
    pub async fn report_thread(&self, thread_id: &str) -> Result<()> {
        let id = parse_id(thread_id, "thread_id", "thread")?;

        if !self.repo.mark_reported(id).await? {
            return Err(BoardError::thread_not_found(thread_id));
        }
        tracing::info!(thread_id = %id, "thread reported");
        Ok(())
    }

    /// Removes the thread and all of its replies if the password matches.
    pub async fn delete_thread(&self, thread_id: &str, password: &str) -> Result<()> {
        require(thread_id, "thread_id")?;
        require(password, "delete_password")?;
        let id = parse_id(thread_id, "thread_id", "thread")?;

        let thread = self
            .repo
            .find(id)
            .await?
            .ok_or_else(|| BoardError::thread_not_found(thread_id))?;

        crate::check_password(&self.hasher, password, &thread.delete_password).await?;

        if !self.repo.delete(id).await? {
            // Deleted concurrently between the load and the delete.
            return Err(BoardError::thread_not_found(thread_id));
        }
        tracing::info!(thread_id = %id, "thread deleted");
        Ok(())
    }
}
