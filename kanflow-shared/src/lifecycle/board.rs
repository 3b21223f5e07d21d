/// Board lifecycle manager
///
/// Creates, updates, and deletes boards while maintaining the invariant
/// that the owner is always a member. Member lists coming from clients are
/// run through [`normalize_members`] before they touch storage, so an
/// omitted or duplicated owner can never corrupt the membership relation.

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorization::{normalize_members, AccessError, BoardPolicy};
use crate::models::board::Board;
use crate::models::comment::Comment;
use crate::models::membership::BoardMember;
use crate::models::task::Task;
use crate::models::user::User;

/// Input for creating a board
#[derive(Debug, Clone)]
pub struct CreateBoard {
    /// Board name
    pub name: String,

    /// Board description
    pub description: String,

    /// Initial members; the owner is added whether or not it is listed
    pub members: Vec<Uuid>,
}

/// Patch for updating a board
///
/// `None` fields are left unchanged. A present `members` list *replaces*
/// the member set (owner re-added as needed).
#[derive(Debug, Clone, Default)]
pub struct UpdateBoard {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// Replacement member list
    pub members: Option<Vec<Uuid>>,
}

/// Creates a board owned by `owner_id`
///
/// The owner becomes a member unconditionally; requested members are
/// validated against the user directory before being attached.
///
/// # Errors
///
/// - [`AccessError::NotFound`]\("user"\) when a requested member does not
///   exist
/// - [`AccessError::Database`] on storage failure
pub async fn create_board(
    pool: &PgPool,
    owner_id: Uuid,
    input: CreateBoard,
) -> Result<Board, AccessError> {
    let mut tx = pool.begin().await?;

    ensure_users_exist(&mut tx, &input.members).await?;

    let board = Board::insert(&mut *tx, owner_id, &input.name, &input.description).await?;

    let members = normalize_members(owner_id, &input.members);
    BoardMember::add_many(&mut *tx, board.id, &members).await?;

    tx.commit().await?;

    info!(
        board_id = %board.id,
        owner_id = %owner_id,
        member_count = members.len(),
        "Board created"
    );

    Ok(board)
}

/// Updates a board; owner only
///
/// After applying the patch the owner is unconditionally re-added to the
/// member set, so even a replacement list that omits the owner leaves the
/// invariant intact.
///
/// # Errors
///
/// - [`AccessError::NotFound`]\("board"\) when the board does not exist
/// - [`AccessError::AccessDenied`] when the requester is not a participant
/// - [`AccessError::NotOwner`] when the requester is a non-owner participant
pub async fn update_board(
    pool: &PgPool,
    requester: Uuid,
    board_id: Uuid,
    patch: UpdateBoard,
) -> Result<Board, AccessError> {
    let mut tx = pool.begin().await?;

    let policy = BoardPolicy::load(&mut *tx, board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))?;
    policy.authorize(requester)?;
    policy.require_owner(requester)?;

    let board = Board::update_fields(
        &mut *tx,
        board_id,
        patch.name.as_deref(),
        patch.description.as_deref(),
    )
    .await?;

    match patch.members {
        Some(requested) => {
            ensure_users_exist(&mut tx, &requested).await?;

            let members = normalize_members(policy.owner_id(), &requested);
            BoardMember::delete_all(&mut *tx, board_id).await?;
            BoardMember::add_many(&mut *tx, board_id, &members).await?;

            debug!(
                board_id = %board_id,
                member_count = members.len(),
                "Board member set replaced"
            );
        }
        None => {
            // Mirrors the replacement path's guarantee on patches that do
            // not touch members.
            BoardMember::add(&mut *tx, board_id, policy.owner_id()).await?;
        }
    }

    tx.commit().await?;

    info!(board_id = %board_id, requester = %requester, "Board updated");

    Ok(board)
}

/// Deletes a board and everything on it; owner only
///
/// The cascade is explicit and ordered within one transaction: comments of
/// the board's tasks, then the tasks, then the membership rows, then the
/// board row itself.
///
/// # Errors
///
/// Same taxonomy as [`update_board`].
pub async fn delete_board(
    pool: &PgPool,
    requester: Uuid,
    board_id: Uuid,
) -> Result<(), AccessError> {
    let mut tx = pool.begin().await?;

    let policy = BoardPolicy::load(&mut *tx, board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))?;
    policy.authorize(requester)?;
    policy.require_owner(requester)?;

    let comments_removed = Comment::delete_for_board(&mut *tx, board_id).await?;
    let tasks_removed = Task::delete_by_board(&mut *tx, board_id).await?;
    BoardMember::delete_all(&mut *tx, board_id).await?;
    Board::delete(&mut *tx, board_id).await?;

    tx.commit().await?;

    info!(
        board_id = %board_id,
        requester = %requester,
        tasks_removed,
        comments_removed,
        "Board deleted"
    );

    Ok(())
}

/// Authorizes read access to a board and returns it
///
/// The read-side guard for the board detail view. Listing is different: it
/// filters by visibility instead of failing (see
/// [`Board::list_visible_summaries`]).
///
/// # Errors
///
/// - [`AccessError::NotFound`]\("board"\) when the board does not exist
/// - [`AccessError::AccessDenied`] when the requester is not a participant
pub async fn authorize_board_view(
    pool: &PgPool,
    requester: Uuid,
    board_id: Uuid,
) -> Result<Board, AccessError> {
    let policy = BoardPolicy::load(pool, board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))?;
    policy.authorize(requester)?;

    Board::find_by_id(pool, board_id)
        .await?
        .ok_or(AccessError::NotFound("board"))
}

/// Verifies that every ID in `user_ids` is an existing user
async fn ensure_users_exist(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_ids: &[Uuid],
) -> Result<(), AccessError> {
    if user_ids.is_empty() {
        return Ok(());
    }

    let existing = User::existing_ids(&mut **tx, user_ids).await?;
    if user_ids.iter().any(|id| !existing.contains(id)) {
        return Err(AccessError::NotFound("user"));
    }

    Ok(())
}
