//! # Domain Models
//!
//! A `Thread` is the unit of storage: it owns its replies as an embedded,
//! ordered sequence. Replies have no identity outside their parent thread.
//! We use UUID v7 for time-ordered, unique identification.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text written over a reply when its author deletes it.
pub const DELETED_PLACEHOLDER: &str = "[deleted]";

/// Current time at millisecond precision.
///
/// Every backend must round-trip timestamps exactly, otherwise `bumped_on`
/// drifts from the `created_on` of the reply that bumped it.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A top-level post on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: Uuid,
    /// The board name (e.g., "testing" for /b/testing/)
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    /// The timestamp used for sorting threads by activity
    pub bumped_on: DateTime<Utc>,
    pub reported: bool,
    /// PHC-formatted salted hash, never the plaintext
    pub delete_password: String,
    /// Oldest first
    pub replies: Vec<Reply>,
}

impl Thread {
    pub fn new(board: String, text: String, delete_password: String) -> Self {
        let created_on = now();
        Self {
            id: Uuid::now_v7(),
            board,
            text,
            created_on,
            bumped_on: created_on,
            reported: false,
            delete_password,
            replies: Vec::new(),
        }
    }

    /// Appends a reply and bumps the thread to the reply's creation time.
    pub fn push_reply(&mut self, reply: Reply) {
        self.bumped_on = reply.created_on;
        self.replies.push(reply);
    }

    pub fn reply(&self, id: Uuid) -> Option<&Reply> {
        self.replies.iter().find(|r| r.id == id)
    }

    pub fn reply_mut(&mut self, id: Uuid) -> Option<&mut Reply> {
        self.replies.iter_mut().find(|r| r.id == id)
    }

    /// Keeps only the last `n` replies, preserving their order.
    pub fn truncate_replies(&mut self, n: usize) {
        let skip = self.replies.len().saturating_sub(n);
        self.replies.drain(..skip);
    }
}

/// A child post, embedded in exactly one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub reported: bool,
    pub delete_password: String,
}

impl Reply {
    pub fn new(text: String, delete_password: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            text,
            created_on: now(),
            reported: false,
            delete_password,
        }
    }

    /// Logical deletion: the reply keeps its slot, id and timestamp.
    pub fn soft_delete(&mut self, placeholder: &str) {
        self.text = placeholder.to_string();
    }
}

/// Field changes for one stored reply.
///
/// Serializes to just the fields that are set, so a store can merge it
/// into the embedded reply document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported: Option<bool>,
}

impl ReplyPatch {
    pub fn report() -> Self {
        Self {
            reported: Some(true),
            ..Self::default()
        }
    }

    pub fn soft_delete(placeholder: &str) -> Self {
        Self {
            text: Some(placeholder.to_string()),
            ..Self::default()
        }
    }

    pub fn apply(&self, reply: &mut Reply) {
        if let Some(text) = &self.text {
            reply.soft_delete(text);
        }
        if let Some(reported) = self.reported {
            reply.reported = reported;
        }
    }
}

/// Input for a new thread, before validation and hashing.
#[derive(Debug, Clone, Default)]
pub struct NewThread {
    pub board: String,
    pub text: String,
    pub delete_password: String,
}

/// Input for a new reply, before validation and hashing.
#[derive(Debug, Clone, Default)]
pub struct NewReply {
    pub board: String,
    pub thread_id: String,
    pub text: String,
    pub delete_password: String,
}

/// Limits applied when rendering a board's front page.
#[derive(Debug, Clone)]
pub struct ListingLimits {
    pub thread_limit: usize,
    pub reply_preview: usize,
    pub deleted_placeholder: String,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            thread_limit: 10,
            reply_preview: 3,
            deleted_placeholder: DELETED_PLACEHOLDER.to_string(),
        }
    }
}
