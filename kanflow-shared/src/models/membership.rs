/// Board membership relation and database operations
///
/// A many-to-many relation between boards and users. Membership carries no
/// role: the only elevated participant is the board owner, recorded on the
/// board row itself. The lifecycle layer guarantees the owner always has a
/// membership row after any create or update.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Membership row linking a user to a board
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardMember {
    /// Board ID
    pub board_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl BoardMember {
    /// Adds a user to a board
    ///
    /// Idempotent: adding an existing member is a no-op.
    pub async fn add(
        executor: impl PgExecutor<'_>,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (board_id, user_id) DO NOTHING
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Adds a set of users to a board in one statement
    ///
    /// Idempotent per user, like [`BoardMember::add`].
    pub async fn add_many(
        executor: impl PgExecutor<'_>,
        board_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id)
            SELECT $1, u FROM UNNEST($2::uuid[]) AS u
            ON CONFLICT (board_id, user_id) DO NOTHING
            "#,
        )
        .bind(board_id)
        .bind(user_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Removes every membership row of a board
    ///
    /// Used by member-set replacement and by board deletion; both re-add or
    /// delete within the same transaction.
    pub async fn delete_all(
        executor: impl PgExecutor<'_>,
        board_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM board_members WHERE board_id = $1")
            .bind(board_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists the user IDs of a board's members, oldest membership first
    pub async fn list_user_ids(
        executor: impl PgExecutor<'_>,
        board_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT user_id FROM board_members
            WHERE board_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Checks whether a user has a membership row on a board
    ///
    /// Note this is the raw relation; participant checks should go through
    /// [`crate::auth::authorization::BoardPolicy`], which also recognizes
    /// the owner.
    pub async fn exists(
        executor: impl PgExecutor<'_>,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM board_members
                WHERE board_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }
}
