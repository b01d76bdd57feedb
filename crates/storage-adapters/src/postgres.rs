//! # Postgres thread store
//!
//! One row per thread. Replies are embedded in a `JSONB` array column so that
//! a thread stays a single document: append + bump is one `UPDATE`, a reply
//! patch is merged in place by one `UPDATE`, and the board listing slices the
//! reply preview inside the query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Reply, ReplyPatch, Thread, ThreadPreview, ThreadRepository};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

pub struct PostgresThreadRepository {
    pool: PgPool,
}

impl PostgresThreadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool and brings the schema up to date.
    ///
    /// Must complete before the server accepts requests.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        let repo = Self::new(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("thread schema migrated");
        Ok(())
    }
}

const THREAD_COLUMNS: &str =
    "id, board, text, created_on, bumped_on, reported, delete_password, replies";

fn thread_from_row(row: &PgRow) -> anyhow::Result<Thread> {
    let replies: Json<Vec<Reply>> = row.try_get("replies")?;
    Ok(Thread {
        id: row.try_get("id")?,
        board: row.try_get("board")?,
        text: row.try_get("text")?,
        created_on: row.try_get::<DateTime<Utc>, _>("created_on")?,
        bumped_on: row.try_get::<DateTime<Utc>, _>("bumped_on")?,
        reported: row.try_get("reported")?,
        delete_password: row.try_get("delete_password")?,
        replies: replies.0,
    })
}

#[async_trait]
impl ThreadRepository for PostgresThreadRepository {
    async fn insert(&self, thread: Thread) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO threads ({THREAD_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(thread.id)
        .bind(&thread.board)
        .bind(&thread.text)
        .bind(thread.created_on)
        .bind(thread.bumped_on)
        .bind(thread.reported)
        .bind(&thread.delete_password)
        .bind(Json(&thread.replies))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Thread>> {
        let row = sqlx::query(&format!("SELECT {THREAD_COLUMNS} FROM threads WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(thread_from_row).transpose()
    }

    /// Sorting, limiting and the reply slice all happen in SQL.
    async fn list_recent(
        &self,
        board: &str,
        limit: usize,
        reply_preview: usize,
    ) -> anyhow::Result<Vec<ThreadPreview>> {
        let rows = sqlx::query(
            "SELECT id, board, text, created_on, bumped_on, reported, delete_password,
                    jsonb_array_length(replies)::BIGINT AS reply_count,
                    COALESCE(
                        (SELECT jsonb_agg(e.reply ORDER BY e.pos)
                           FROM jsonb_array_elements(replies) WITH ORDINALITY AS e(reply, pos)
                          WHERE e.pos > jsonb_array_length(replies) - $3),
                        '[]'::jsonb) AS replies
               FROM threads
              WHERE board = $1
              ORDER BY bumped_on DESC, id DESC
              LIMIT $2",
        )
        .bind(board)
        .bind(i64::try_from(limit)?)
        .bind(i64::try_from(reply_preview)?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> anyhow::Result<ThreadPreview> {
                let reply_count: i64 = row.try_get("reply_count")?;
                Ok(ThreadPreview {
                    thread: thread_from_row(row)?,
                    reply_count: usize::try_from(reply_count)?,
                })
            })
            .collect()
    }

    async fn mark_reported(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE threads SET reported = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM threads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn push_reply(&self, thread_id: Uuid, reply: Reply) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE threads
                SET replies = replies || jsonb_build_array($2::jsonb),
                    bumped_on = $3
              WHERE id = $1",
        )
        .bind(thread_id)
        .bind(Json(&reply))
        .bind(reply.created_on)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        patch: ReplyPatch,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE threads
                SET replies = (
                    SELECT jsonb_agg(
                             CASE WHEN e.reply->>'id' = $2 THEN e.reply || $3::jsonb
                                  ELSE e.reply END
                             ORDER BY e.pos)
                      FROM jsonb_array_elements(replies) WITH ORDINALITY AS e(reply, pos))
              WHERE id = $1
                AND replies @> jsonb_build_array(jsonb_build_object('id', $2::text))",
        )
        .bind(thread_id)
        .bind(reply_id.to_string())
        .bind(Json(&patch))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// These need a live database: `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> PostgresThreadRepository {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        PostgresThreadRepository::connect(&url, 2)
            .await
            .expect("Failed to connect to Postgres")
    }

    #[tokio::test]
    #[ignore]
    async fn test_reply_round_trip_preserves_bump() {
        let repo = repo().await;
        let thread = Thread::new("pg-testing".into(), "op".into(), "h".into());
        let id = thread.id;
        repo.insert(thread).await.unwrap();

        let reply = Reply::new("hi".into(), "h".into());
        let created = reply.created_on;
        assert!(repo.push_reply(id, reply).await.unwrap());

        let stored = repo.find(id).await.unwrap().unwrap();
        assert_eq!(stored.bumped_on, created);
        assert_eq!(stored.replies[0].created_on, created);

        assert!(repo.delete(id).await.unwrap());
    }

    #[tokio::test]
    #[ignore]
    async fn test_listing_slices_replies_in_sql() {
        let repo = repo().await;
        let board = format!("pg-{}", Uuid::now_v7());
        let thread = Thread::new(board.clone(), "op".into(), "h".into());
        let id = thread.id;
        repo.insert(thread).await.unwrap();
        for i in 0..5 {
            repo.push_reply(id, Reply::new(format!("r{i}"), "h".into()))
                .await
                .unwrap();
        }

        let listed = repo.list_recent(&board, 10, 3).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].reply_count, 5);
        let texts: Vec<_> = listed[0].thread.replies.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["r2", "r3", "r4"]);

        repo.delete(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_update_reply_keeps_concurrent_append() {
        let repo = repo().await;
        let thread = Thread::new("pg-testing".into(), "op".into(), "h".into());
        let id = thread.id;
        repo.insert(thread).await.unwrap();
        let first = Reply::new("r0".into(), "h".into());
        let first_id = first.id;
        repo.push_reply(id, first).await.unwrap();

        let _stale = repo.find(id).await.unwrap().unwrap();
        let second = Reply::new("r1".into(), "h".into());
        let second_created = second.created_on;
        repo.push_reply(id, second).await.unwrap();

        assert!(repo
            .update_reply(id, first_id, ReplyPatch::report())
            .await
            .unwrap());
        assert!(!repo
            .update_reply(id, Uuid::now_v7(), ReplyPatch::report())
            .await
            .unwrap());

        let stored = repo.find(id).await.unwrap().unwrap();
        assert_eq!(stored.replies.len(), 2);
        assert!(stored.replies[0].reported);
        assert!(!stored.replies[1].reported);
        assert_eq!(stored.replies[1].text, "r1");
        assert_eq!(stored.bumped_on, second_created);

        repo.delete(id).await.unwrap();
    }
}
