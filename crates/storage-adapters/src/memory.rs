//! # In-memory thread store
//!
//! A `DashMap` keyed by thread id. Each thread document sits behind its
//! shard lock, so single-document updates (append + bump) are atomic.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{Reply, ReplyPatch, Thread, ThreadPreview, ThreadRepository};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryThreadRepository {
    threads: Arc<DashMap<Uuid, Thread>>,
}

impl InMemoryThreadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

#[async_trait]
impl ThreadRepository for InMemoryThreadRepository {
    async fn insert(&self, thread: Thread) -> anyhow::Result<()> {
        if self.threads.contains_key(&thread.id) {
            anyhow::bail!("duplicate thread id {}", thread.id);
        }
        self.threads.insert(thread.id, thread);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Thread>> {
        Ok(self.threads.get(&id).map(|t| t.value().clone()))
    }

    async fn list_recent(
        &self,
        board: &str,
        limit: usize,
        reply_preview: usize,
    ) -> anyhow::Result<Vec<ThreadPreview>> {
        let mut matching: Vec<Thread> = self
            .threads
            .iter()
            .filter(|t| t.board == board)
            .map(|t| t.value().clone())
            .collect();

        // Ties on bump time fall back to the time-ordered id.
        matching.sort_by_key(|t| Reverse((t.bumped_on, t.id)));
        matching.truncate(limit);

        Ok(matching
            .into_iter()
            .map(|mut thread| {
                let reply_count = thread.replies.len();
                thread.truncate_replies(reply_preview);
                ThreadPreview {
                    thread,
                    reply_count,
                }
            })
            .collect())
    }

    async fn mark_reported(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self
            .threads
            .get_mut(&id)
            .map(|mut t| t.reported = true)
            .is_some())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.threads.remove(&id).is_some())
    }

    async fn push_reply(&self, thread_id: Uuid, reply: Reply) -> anyhow::Result<bool> {
        match self.threads.get_mut(&thread_id) {
            Some(mut thread) => {
                thread.push_reply(reply);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        patch: ReplyPatch,
    ) -> anyhow::Result<bool> {
        let Some(mut thread) = self.threads.get_mut(&thread_id) else {
            return Ok(false);
        };
        match thread.reply_mut(reply_id) {
            Some(reply) => {
                patch.apply(reply);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
