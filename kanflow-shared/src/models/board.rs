/// Board model and database operations
///
/// A board groups tasks and members. The owner is set at creation and never
/// changes; the lifecycle layer keeps the owner present in the membership
/// relation after every create/update.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Board model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Board name
    pub name: String,

    /// Board description (may be empty)
    pub description: String,

    /// Owning user; immutable after creation
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// One row of the visible-board listing, with the counters the board
/// overview shows per board
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardSummaryRow {
    /// Board ID
    pub id: Uuid,

    /// Board name
    pub name: String,

    /// Owning user
    pub owner_id: Uuid,

    /// Number of members (owner included)
    pub member_count: i64,

    /// Total tasks on the board
    pub ticket_count: i64,

    /// Tasks still in `to-do` status
    pub tasks_to_do_count: i64,

    /// Tasks with high or critical priority
    pub tasks_high_prio_count: i64,
}

impl Board {
    /// Inserts a new board row
    ///
    /// Membership rows (including the owner's) are written separately by the
    /// lifecycle layer inside the same transaction.
    pub async fn insert(
        executor: impl PgExecutor<'_>,
        owner_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(owner_id)
        .fetch_one(executor)
        .await
    }

    /// Finds a board by ID
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, description, owner_id, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Updates name and/or description, leaving absent fields unchanged
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::RowNotFound` if the board does not exist.
    pub async fn update_fields(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
    }

    /// Deletes a board row
    ///
    /// Returns true if a row was deleted. Tasks, comments, and memberships
    /// are removed explicitly by the lifecycle layer before this runs.
    pub async fn delete(executor: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists summaries of every board the user owns or is a member of
    ///
    /// This is the visibility operation for the board overview: boards the
    /// user cannot see are filtered out here, which is distinct from an
    /// authorization failure on direct access. Results are deduplicated and
    /// ordered by name.
    pub async fn list_visible_summaries(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Vec<BoardSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, BoardSummaryRow>(
            r#"
            SELECT b.id,
                   b.name,
                   b.owner_id,
                   (SELECT COUNT(*) FROM board_members m WHERE m.board_id = b.id) AS member_count,
                   (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id) AS ticket_count,
                   (SELECT COUNT(*) FROM tasks t
                     WHERE t.board_id = b.id AND t.status = 'to-do') AS tasks_to_do_count,
                   (SELECT COUNT(*) FROM tasks t
                     WHERE t.board_id = b.id
                       AND t.priority IN ('high', 'critical')) AS tasks_high_prio_count
            FROM boards b
            WHERE b.owner_id = $1
               OR EXISTS(SELECT 1 FROM board_members m
                          WHERE m.board_id = b.id AND m.user_id = $1)
            ORDER BY b.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    // Board CRUD is exercised through the lifecycle managers against a live
    // database; the pure authorization rules over boards are tested in
    // crate::auth::authorization.
}
