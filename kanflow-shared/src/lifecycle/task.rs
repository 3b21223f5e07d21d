/// Task lifecycle manager
///
/// Composes the task access guard around field-level create/update/delete.
/// The board a task is created on is fixed forever: membership — and with
/// it authorization — is anchored at creation time, so a board change is
/// rejected outright on update.
///
/// Participant references are validated only when the patch mentions them.
/// An update that leaves `assignee`/`reviewer` untouched does not re-check
/// the stored values, so an assignee who has since been removed from the
/// board survives no-op updates. Callers that want eager cleanup must
/// re-set the fields explicitly.

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{
    ensure_board_unchanged, AccessError, BoardPolicy, ParticipantField,
};
use crate::models::comment::Comment;
use crate::models::task::{NewTask, Task, TaskPriority, TaskStatus};

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Target board; must exist and is immutable afterwards
    pub board_id: Uuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Priority (defaults to medium upstream)
    pub priority: TaskPriority,

    /// Status (defaults to to-do upstream)
    pub status: TaskStatus,

    /// Optional assignee; must be a participant of the target board
    pub assignee_id: Option<Uuid>,

    /// Optional reviewer; must be a participant of the target board
    pub reviewer_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,
}

/// Patch for updating a task
///
/// Outer `None` means "leave unchanged". For the nullable fields the inner
/// option distinguishes "set to this user/date" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New status
    pub status: Option<TaskStatus>,

    /// Proposed board; anything other than the current board is rejected
    pub board_id: Option<Uuid>,

    /// New assignee (`Some(None)` clears it)
    pub assignee_id: Option<Option<Uuid>>,

    /// New reviewer (`Some(None)` clears it)
    pub reviewer_id: Option<Option<Uuid>>,

    /// New due date (`Some(None)` clears it)
    pub due_date: Option<Option<NaiveDate>>,
}

/// Creates a task on a board
///
/// Flow: the *target* board must exist, the requester must be one of its
/// participants, a present assignee/reviewer must be a participant too;
/// then the task is persisted with the board fixed forever.
///
/// # Errors
///
/// - [`AccessError::NotFound`]\("board"\) when the target board is missing
/// - [`AccessError::AccessDenied`] when the requester is not a participant
/// - [`AccessError::InvalidParticipant`] for an out-of-board
///   assignee/reviewer
pub async fn create_task(
    pool: &PgPool,
    requester: Uuid,
    input: CreateTask,
) -> Result<Task, AccessError> {
    let mut tx = pool.begin().await?;

    let policy = BoardPolicy::load(&mut *tx, input.board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))?;
    policy.authorize(requester)?;
    policy.validate_participant(ParticipantField::Assignee, input.assignee_id)?;
    policy.validate_participant(ParticipantField::Reviewer, input.reviewer_id)?;

    let task = Task::insert(
        &mut *tx,
        NewTask {
            board_id: input.board_id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            assignee_id: input.assignee_id,
            reviewer_id: input.reviewer_id,
            due_date: input.due_date,
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        task_id = %task.id,
        board_id = %task.board_id,
        requester = %requester,
        "Task created"
    );

    Ok(task)
}

/// Updates a task
///
/// Flow: authorize against the *existing* board, reject any board change
/// outright, validate the participant fields present in the patch against
/// the unchanged board, then persist the merged fields.
///
/// # Errors
///
/// - [`AccessError::NotFound`]\("task"\) when the task is missing
/// - [`AccessError::AccessDenied`] when the requester is not a participant
/// - [`AccessError::BoardReassignmentForbidden`] when the patch names a
///   different board
/// - [`AccessError::InvalidParticipant`] for an out-of-board
///   assignee/reviewer
pub async fn update_task(
    pool: &PgPool,
    requester: Uuid,
    task_id: Uuid,
    patch: TaskPatch,
) -> Result<Task, AccessError> {
    let mut tx = pool.begin().await?;

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(AccessError::NotFound("task"))?;

    let policy = BoardPolicy::load(&mut *tx, task.board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))?;
    policy.authorize(requester)?;

    ensure_board_unchanged(task.board_id, patch.board_id)?;

    if let Some(assignee) = patch.assignee_id {
        policy.validate_participant(ParticipantField::Assignee, assignee)?;
    }
    if let Some(reviewer) = patch.reviewer_id {
        policy.validate_participant(ParticipantField::Reviewer, reviewer)?;
    }

    let updated = Task::update_row(
        &mut *tx,
        task.id,
        patch.title.as_deref().unwrap_or(&task.title),
        patch.description.as_deref().unwrap_or(&task.description),
        patch.priority.unwrap_or(task.priority),
        patch.status.unwrap_or(task.status),
        patch.assignee_id.unwrap_or(task.assignee_id),
        patch.reviewer_id.unwrap_or(task.reviewer_id),
        patch.due_date.unwrap_or(task.due_date),
    )
    .await?;

    tx.commit().await?;

    info!(task_id = %task.id, requester = %requester, "Task updated");

    Ok(updated)
}

/// Deletes a task and its comments
///
/// Any board participant may delete; only the existing board is checked,
/// there is nothing left to validate participants against.
///
/// # Errors
///
/// - [`AccessError::NotFound`]\("task"\) when the task is missing
/// - [`AccessError::AccessDenied`] when the requester is not a participant
pub async fn delete_task(
    pool: &PgPool,
    requester: Uuid,
    task_id: Uuid,
) -> Result<(), AccessError> {
    let mut tx = pool.begin().await?;

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(AccessError::NotFound("task"))?;

    let policy = BoardPolicy::load(&mut *tx, task.board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))?;
    policy.authorize(requester)?;

    let comments_removed = Comment::delete_by_task(&mut *tx, task_id).await?;
    Task::delete(&mut *tx, task_id).await?;

    tx.commit().await?;

    info!(
        task_id = %task_id,
        requester = %requester,
        comments_removed,
        "Task deleted"
    );

    Ok(())
}

/// Authorizes read access to a task and returns it
///
/// Delegates the access decision to the task's board.
///
/// # Errors
///
/// - [`AccessError::NotFound`]\("task"\) when the task is missing
/// - [`AccessError::AccessDenied`] when the requester is not a participant
pub async fn authorize_task_view(
    pool: &PgPool,
    requester: Uuid,
    task_id: Uuid,
) -> Result<Task, AccessError> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(AccessError::NotFound("task"))?;

    let policy = BoardPolicy::load(pool, task.board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))?;
    policy.authorize(requester)?;

    Ok(task)
}
