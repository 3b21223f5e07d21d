/// Comment lifecycle manager
///
/// Comment creation requires board participation at creation time; the
/// comment then lives on regardless of later membership changes. Deletion
/// is reserved for the comment's author and the board owner, who acts as
/// moderator.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{authorize_comment_delete, AccessError, BoardPolicy};
use crate::models::comment::Comment;
use crate::models::task::Task;

/// Adds a comment to a task
///
/// # Errors
///
/// - [`AccessError::NotFound`]\("task"\) when the task is missing
/// - [`AccessError::AccessDenied`] when the author is not a participant of
///   the task's board
pub async fn add_comment(
    pool: &PgPool,
    author: Uuid,
    task_id: Uuid,
    content: &str,
) -> Result<Comment, AccessError> {
    let mut tx = pool.begin().await?;

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(AccessError::NotFound("task"))?;

    let policy = BoardPolicy::load(&mut *tx, task.board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))?;
    policy.authorize(author)?;

    let comment = Comment::insert(&mut *tx, task_id, author, content).await?;

    tx.commit().await?;

    info!(
        comment_id = %comment.id,
        task_id = %task_id,
        author = %author,
        "Comment added"
    );

    Ok(comment)
}

/// Deletes a comment; author or board owner only
///
/// The requester must still be a board participant — a non-participant is
/// denied access before the author/owner rule is ever consulted.
///
/// # Errors
///
/// - [`AccessError::NotFound`]\("comment"\) when the comment is missing or
///   belongs to a different task
/// - [`AccessError::AccessDenied`] when the requester is not a participant
/// - [`AccessError::CommentDeleteForbidden`] for participants who are
///   neither author nor owner
pub async fn delete_comment(
    pool: &PgPool,
    requester: Uuid,
    task_id: Uuid,
    comment_id: Uuid,
) -> Result<(), AccessError> {
    let mut tx = pool.begin().await?;

    let comment = Comment::find_by_id(&mut *tx, comment_id)
        .await?
        .filter(|c| c.task_id == task_id)
        .ok_or(AccessError::NotFound("comment"))?;

    let task = Task::find_by_id(&mut *tx, comment.task_id)
        .await?
        .ok_or(AccessError::NotFound("task"))?;

    let policy = BoardPolicy::load(&mut *tx, task.board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))?;
    authorize_comment_delete(&policy, requester, comment.author_id)?;

    Comment::delete(&mut *tx, comment_id).await?;

    tx.commit().await?;

    info!(
        comment_id = %comment_id,
        task_id = %task_id,
        requester = %requester,
        "Comment deleted"
    );

    Ok(())
}
