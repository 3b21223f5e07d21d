/// Comment model and database operations
///
/// Comments are append-only child records of a task. The author must have
/// had board access when the comment was created; that access is not
/// re-validated afterward, so a comment can outlive its author's
/// membership.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Owning task
    pub task_id: Uuid,

    /// Comment author
    pub author_id: Uuid,

    /// Comment text
    pub content: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author's display name, the shape the comment
/// listing returns
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentWithAuthor {
    /// Comment ID
    pub id: Uuid,

    /// Comment text
    pub content: String,

    /// Author display name
    pub author: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// Per-task comment count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskCommentCount {
    /// Task ID
    pub task_id: Uuid,

    /// Number of comments on the task
    pub count: i64,
}

impl Comment {
    /// Inserts a new comment
    pub async fn insert(
        executor: impl PgExecutor<'_>,
        task_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, author_id, content, created_at
            "#,
        )
        .bind(task_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(executor)
        .await
    }

    /// Finds a comment by ID
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Lists a task's comments with author names, oldest first
    pub async fn list_by_task(
        executor: impl PgExecutor<'_>,
        task_id: Uuid,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.content, u.full_name AS author, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.task_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }

    /// Counts comments for a set of tasks
    ///
    /// Tasks without comments are omitted; callers treat missing entries as
    /// zero.
    pub async fn counts_by_tasks(
        executor: impl PgExecutor<'_>,
        task_ids: &[Uuid],
    ) -> Result<Vec<TaskCommentCount>, sqlx::Error> {
        sqlx::query_as::<_, TaskCommentCount>(
            r#"
            SELECT task_id, COUNT(*) AS count
            FROM comments
            WHERE task_id = ANY($1)
            GROUP BY task_id
            "#,
        )
        .bind(task_ids)
        .fetch_all(executor)
        .await
    }

    /// Deletes every comment on a task, returning the number removed
    pub async fn delete_by_task(
        executor: impl PgExecutor<'_>,
        task_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE task_id = $1")
            .bind(task_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every comment on every task of a board
    ///
    /// First step of the explicit board-delete cascade.
    pub async fn delete_for_board(
        executor: impl PgExecutor<'_>,
        board_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM comments WHERE task_id IN (SELECT id FROM tasks WHERE board_id = $1)",
        )
        .bind(board_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a comment row
    pub async fn delete(executor: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
