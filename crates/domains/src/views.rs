//! # Read Views
//!
//! What readers are allowed to see. These types have no `reported` or
//! `delete_password` field, so no serialization path can leak them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Reply, Thread};

/// A thread as returned by the board listing: the thread plus the total
/// number of replies it held before the preview slice was cut.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadPreview {
    pub thread: Thread,
    pub reply_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub board: String,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
    pub replycount: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
}

impl From<Reply> for ReplyView {
    fn from(r: Reply) -> Self {
        Self {
            id: r.id,
            text: r.text,
            created_on: r.created_on,
        }
    }
}

impl From<Thread> for ThreadView {
    fn from(t: Thread) -> Self {
        let replycount = t.replies.len();
        Self {
            id: t.id,
            board: t.board,
            text: t.text,
            created_on: t.created_on,
            bumped_on: t.bumped_on,
            replies: t.replies.into_iter().map(ReplyView::from).collect(),
            replycount,
        }
    }
}

impl From<ThreadPreview> for ThreadView {
    fn from(p: ThreadPreview) -> Self {
        let mut view = ThreadView::from(p.thread);
        view.replycount = p.reply_count;
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_thread_never_carries_secrets() {
        let mut thread = Thread::new("b".into(), "op".into(), "$argon2id$secret".into());
        thread.reported = true;
        let mut reply = Reply::new("r".into(), "$argon2id$other".into());
        reply.reported = true;
        thread.push_reply(reply);

        let json = serde_json::to_value(ThreadView::from(thread)).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("_id"));
        assert!(!obj.contains_key("delete_password"));
        assert!(!obj.contains_key("reported"));

        let reply = json["replies"][0].as_object().unwrap();
        assert!(reply.contains_key("_id"));
        assert!(!reply.contains_key("delete_password"));
        assert!(!reply.contains_key("reported"));
    }

    #[test]
    fn preview_reports_untruncated_count() {
        let mut thread = Thread::new("b".into(), "op".into(), "h".into());
        for i in 0..4 {
            thread.push_reply(Reply::new(format!("r{i}"), "h".into()));
        }
        thread.truncate_replies(3);
        let view = ThreadView::from(ThreadPreview {
            thread,
            reply_count: 4,
        });
        assert_eq!(view.replies.len(), 3);
        assert_eq!(view.replycount, 4);
    }
}
