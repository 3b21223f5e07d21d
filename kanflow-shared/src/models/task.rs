/// Task model and database operations
///
/// Tasks belong to exactly one board, fixed at creation. Priority and
/// status are free-form user-settable values: any status may follow any
/// status, there is no server-enforced transition order.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'critical');
/// CREATE TYPE task_status AS ENUM ('to-do', 'in-progress', 'review', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     status task_status NOT NULL DEFAULT 'to-do',
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     reviewer_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Nice to have
    Low,

    /// Default priority
    Medium,

    /// Should be picked up soon
    High,

    /// Blocking work
    Critical,
}

impl TaskPriority {
    /// Converts priority to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task status (kanban column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    /// Not started
    #[sqlx(rename = "to-do")]
    #[serde(rename = "to-do")]
    ToDo,

    /// Being worked on
    #[sqlx(rename = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,

    /// Waiting for review
    #[sqlx(rename = "review")]
    #[serde(rename = "review")]
    Review,

    /// Finished
    #[sqlx(rename = "done")]
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    /// Converts status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to-do",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::ToDo
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning board; immutable after creation
    pub board_id: Uuid,

    /// Task title
    pub title: String,

    /// Task description (may be empty)
    pub description: String,

    /// Priority
    pub priority: TaskPriority,

    /// Status
    pub status: TaskStatus,

    /// Optional assignee; must be a board participant when set
    pub assignee_id: Option<Uuid>,

    /// Optional reviewer; must be a board participant when set
    pub reviewer_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Field values for inserting a task
///
/// Participant validation happens in the lifecycle layer before this is
/// persisted.
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Target board
    pub board_id: Uuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Priority
    pub priority: TaskPriority,

    /// Status
    pub status: TaskStatus,

    /// Assignee
    pub assignee_id: Option<Uuid>,

    /// Reviewer
    pub reviewer_id: Option<Uuid>,

    /// Due date
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Inserts a new task row
    pub async fn insert(
        executor: impl PgExecutor<'_>,
        data: NewTask,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks
                (board_id, title, description, priority, status,
                 assignee_id, reviewer_id, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, board_id, title, description, priority, status,
                      assignee_id, reviewer_id, due_date, created_at, updated_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.assignee_id)
        .bind(data.reviewer_id)
        .bind(data.due_date)
        .fetch_one(executor)
        .await
    }

    /// Finds a task by ID
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, title, description, priority, status,
                   assignee_id, reviewer_id, due_date, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Writes the full set of mutable columns
    ///
    /// The lifecycle layer computes the merged field values from the stored
    /// task and the patch, then persists them here in one statement.
    /// `board_id` is intentionally not a parameter.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_row(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        title: &str,
        description: &str,
        priority: TaskPriority,
        status: TaskStatus,
        assignee_id: Option<Uuid>,
        reviewer_id: Option<Uuid>,
        due_date: Option<NaiveDate>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                priority = $4,
                status = $5,
                assignee_id = $6,
                reviewer_id = $7,
                due_date = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, board_id, title, description, priority, status,
                      assignee_id, reviewer_id, due_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(status)
        .bind(assignee_id)
        .bind(reviewer_id)
        .bind(due_date)
        .fetch_one(executor)
        .await
    }

    /// Deletes a task row
    ///
    /// Returns true if a row was deleted. Comments are removed explicitly by
    /// the lifecycle layer first.
    pub async fn delete(executor: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every task on a board, returning the number removed
    ///
    /// Part of the explicit board-delete cascade; the caller removes the
    /// tasks' comments first, inside the same transaction.
    pub async fn delete_by_board(
        executor: impl PgExecutor<'_>,
        board_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE board_id = $1")
            .bind(board_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists tasks on a board, newest first
    pub async fn list_by_board(
        executor: impl PgExecutor<'_>,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, title, description, priority, status,
                   assignee_id, reviewer_id, due_date, created_at, updated_at
            FROM tasks
            WHERE board_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Lists every task on boards the user participates in, newest first
    ///
    /// The task-level visibility operation: like the board overview, tasks
    /// the user cannot see are filtered rather than denied.
    pub async fn list_visible(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.board_id, t.title, t.description, t.priority, t.status,
                   t.assignee_id, t.reviewer_id, t.due_date, t.created_at, t.updated_at
            FROM tasks t
            JOIN boards b ON b.id = t.board_id
            WHERE b.owner_id = $1
               OR EXISTS(SELECT 1 FROM board_members m
                          WHERE m.board_id = b.id AND m.user_id = $1)
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Lists tasks where the user is the assignee, newest first
    ///
    /// Personal listing; visibility is inherent (the user appears on every
    /// returned task), so no board guard applies.
    pub async fn list_assigned_to(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, title, description, priority, status,
                   assignee_id, reviewer_id, due_date, created_at, updated_at
            FROM tasks
            WHERE assignee_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Lists tasks where the user is the reviewer, newest first
    pub async fn list_reviewing(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, title, description, priority, status,
                   assignee_id, reviewer_id, due_date, created_at, updated_at
            FROM tasks
            WHERE reviewer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::Low.as_str(), "low");
        assert_eq!(TaskPriority::Medium.as_str(), "medium");
        assert_eq!(TaskPriority::High.as_str(), "high");
        assert_eq!(TaskPriority::Critical.as_str(), "critical");
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::ToDo.as_str(), "to-do");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Review.as_str(), "review");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(TaskStatus::default(), TaskStatus::ToDo);
    }

    #[test]
    fn test_status_serde_wire_names() {
        // The hyphenated names are the wire contract; serde must match the
        // database enum labels exactly.
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);

        let status: TaskStatus = serde_json::from_str(r#""to-do""#).unwrap();
        assert_eq!(status, TaskStatus::ToDo);
    }

    #[test]
    fn test_priority_serde_wire_names() {
        let json = serde_json::to_string(&TaskPriority::Critical).unwrap();
        assert_eq!(json, r#""critical""#);

        let priority: TaskPriority = serde_json::from_str(r#""high""#).unwrap();
        assert_eq!(priority, TaskPriority::High);
    }
}
