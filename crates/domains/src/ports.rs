//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Reply, ReplyPatch, Thread};
use crate::views::ThreadPreview;

/// Document-store contract for threads and their embedded replies.
///
/// Every method is a single round trip against one thread document.
/// Methods addressing a thread by id return `false` / `None` when it
/// does not exist rather than failing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    async fn insert(&self, thread: Thread) -> anyhow::Result<()>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Thread>>;

    /// The `limit` most recently bumped threads of `board`, each cut down
    /// to its last `reply_preview` replies.
    async fn list_recent(
        &self,
        board: &str,
        limit: usize,
        reply_preview: usize,
    ) -> anyhow::Result<Vec<ThreadPreview>>;

    async fn mark_reported(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Atomically appends `reply` and sets `bumped_on` to its `created_on`.
    async fn push_reply(&self, thread_id: Uuid, reply: Reply) -> anyhow::Result<bool>;

    /// Applies `patch` to one reply in place. Other replies, including any
    /// appended since the thread was read, are left alone. Returns `false`
    /// when the thread or the reply does not exist.
    async fn update_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        patch: ReplyPatch,
    ) -> anyhow::Result<bool>;
}

/// One-way salted hashing for delete passwords.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Returns a self-describing hash string (salt and parameters included).
    async fn hash(&self, password: &str) -> anyhow::Result<String>;

    /// Compares `password` against `hash`. A malformed hash is an error,
    /// a wrong password is `Ok(false)`.
    async fn verify(&self, password: &str, hash: &str) -> anyhow::Result<bool>;
}
