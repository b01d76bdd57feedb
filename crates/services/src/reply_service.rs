//! # ReplyService
//!
//! Replies live inside their thread document, so every operation here
//! addresses the parent thread first and the reply second.

use std::sync::Arc;

use domains::{
    BoardError, ListingLimits, NewReply, PasswordHasher, Reply, ReplyPatch, Result,
    ThreadRepository, ThreadView,
};
use uuid::Uuid;

use crate::input::{parse_id, require};

pub struct ReplyService {
    repo: Arc<dyn ThreadRepository>,
    hasher: Arc<dyn PasswordHasher>,
    placeholder: String,
}

impl ReplyService {
    pub fn new(
        repo: Arc<dyn ThreadRepository>,
        hasher: Arc<dyn PasswordHasher>,
        limits: &ListingLimits,
    ) -> Self {
        Self {
            repo,
            hasher,
            placeholder: limits.deleted_placeholder.clone(),
        }
    }

    /// Appends a reply and bumps its thread. Returns the new reply's id.
    pub async fn create_reply(&self, input: NewReply) -> Result<Uuid> {
        require(&input.board, "board")?;
        require(&input.text, "text")?;
        require(&input.delete_password, "delete_password")?;
        let thread_id = parse_id(&input.thread_id, "thread_id", "thread")?;

        let hash = crate::hash_password(&self.hasher, &input.delete_password).await?;
        let reply = Reply::new(input.text, hash);
        let reply_id = reply.id;

        if !self.repo.push_reply(thread_id, reply).await? {
            return Err(BoardError::thread_not_found(input.thread_id));
        }
        tracing::info!(%thread_id, %reply_id, "reply created");
        Ok(reply_id)
    }

    /// The full thread, reached through the replies route.
    pub async fn get_thread(&self, board: &str, thread_id: &str) -> Result<ThreadView> {
        crate::fetch_thread(&self.repo, board, thread_id).await
    }

    /// Flags a reply for moderation. Reporting twice is a no-op.
    pub async fn report_reply(&self, thread_id: &str, reply_id: &str) -> Result<()> {
        require(thread_id, "thread_id")?;
        require(reply_id, "reply_id")?;
        let tid = parse_id(thread_id, "thread_id", "thread")?;
        let rid = parse_id(reply_id, "reply_id", "reply")?;

        let thread = self
            .repo
            .find(tid)
            .await?
            .ok_or_else(|| BoardError::thread_not_found(thread_id))?;
        if thread.reply(rid).is_none() {
            return Err(BoardError::reply_not_found(reply_id));
        }

        if !self.repo.update_reply(tid, rid, ReplyPatch::report()).await? {
            return Err(BoardError::reply_not_found(reply_id));
        }
        tracing::info!(thread_id = %tid, reply_id = %rid, "reply reported");
        Ok(())
    }

    /// Soft delete: the reply keeps its slot but its text is replaced.
    pub async fn delete_reply(&self, thread_id: &str, reply_id: &str, password: &str) -> Result<()> {
        require(thread_id, "thread_id")?;
        require(reply_id, "reply_id")?;
        require(password, "delete_password")?;
        let tid = parse_id(thread_id, "thread_id", "thread")?;
        let rid = parse_id(reply_id, "reply_id", "reply")?;

        let thread = self
            .repo
            .find(tid)
            .await?
            .ok_or_else(|| BoardError::thread_not_found(thread_id))?;
        let reply = thread
            .reply(rid)
            .ok_or_else(|| BoardError::reply_not_found(reply_id))?;

        crate::check_password(&self.hasher, password, &reply.delete_password).await?;

        let patch = ReplyPatch::soft_delete(&self.placeholder);
        if !self.repo.update_reply(tid, rid, patch).await? {
            return Err(BoardError::reply_not_found(reply_id));
        }
        tracing::info!(thread_id = %tid, reply_id = %rid, "reply deleted");
        Ok(())
    }
}
