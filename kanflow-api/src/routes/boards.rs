/// Board endpoints
///
/// Listing is a visibility operation (boards the user cannot see are
/// filtered, not denied); direct access to a board goes through the access
/// guard and fails with a forbidden outcome instead. Update and delete are
/// owner-only.
///
/// # Endpoints
///
/// - `GET    /api/boards` - Boards the user owns or belongs to
/// - `POST   /api/boards` - Create board
/// - `GET    /api/boards/:board_id` - Board detail with members and tasks
/// - `PATCH  /api/boards/:board_id` - Update board (PUT accepted too)
/// - `DELETE /api/boards/:board_id` - Delete board and its contents

use crate::{app::AppState, error::ApiResult, routes::tasks::TaskDetail};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use kanflow_shared::{
    auth::middleware::AuthContext,
    lifecycle::board as board_lifecycle,
    models::board::Board,
    models::membership::BoardMember,
    models::task::Task,
    models::user::{User, UserProfile},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Board description
    #[serde(default)]
    pub description: String,

    /// Initial members; the creator is added whether or not listed
    #[serde(default)]
    pub members: Vec<Uuid>,
}

/// Update board request
///
/// A present `members` list replaces the member set; the owner is re-added
/// if the list omits them.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// Replacement member list
    pub members: Option<Vec<Uuid>>,
}

/// One row of the board overview
#[derive(Debug, Serialize)]
pub struct BoardSummary {
    /// Board ID
    pub id: Uuid,

    /// Board name
    pub name: String,

    /// Owning user
    pub owner_id: Uuid,

    /// Number of members (owner included)
    pub member_count: i64,

    /// Total tasks
    pub ticket_count: i64,

    /// Tasks still to do
    pub tasks_to_do_count: i64,

    /// Tasks with high or critical priority
    pub tasks_high_prio_count: i64,
}

/// Full board payload with members and nested tasks
#[derive(Debug, Serialize)]
pub struct BoardDetail {
    /// Board ID
    pub id: Uuid,

    /// Board name
    pub name: String,

    /// Board description
    pub description: String,

    /// Owning user
    pub owner_id: Uuid,

    /// Owner profile
    pub owner: UserProfile,

    /// Member profiles (owner included)
    pub members: Vec<UserProfile>,

    /// Tasks on the board, newest first
    pub tasks: Vec<TaskDetail>,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Assembles the detail payload for an already-authorized board
async fn board_detail_payload(state: &AppState, board: Board) -> ApiResult<BoardDetail> {
    let member_ids = BoardMember::list_user_ids(&state.db, board.id).await?;
    let members = User::profiles_by_ids(&state.db, &member_ids).await?;

    let owner = User::find_by_id(&state.db, board.owner_id)
        .await?
        .map(|u| u.profile())
        .ok_or_else(|| crate::error::ApiError::NotFound("User not found".to_string()))?;

    let tasks = Task::list_by_board(&state.db, board.id).await?;
    let tasks = crate::routes::tasks::task_details(&state.db, tasks).await?;

    Ok(BoardDetail {
        id: board.id,
        name: board.name,
        description: board.description,
        owner_id: board.owner_id,
        owner,
        members,
        tasks,
        created_at: board.created_at,
        updated_at: board.updated_at,
    })
}

/// Boards the authenticated user owns or belongs to
///
/// Deduplicated and ordered by name, with the overview counters computed
/// per board.
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BoardSummary>>> {
    let rows = Board::list_visible_summaries(&state.db, auth.user_id).await?;

    let summaries = rows
        .into_iter()
        .map(|row| BoardSummary {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
            member_count: row.member_count,
            ticket_count: row.ticket_count,
            tasks_to_do_count: row.tasks_to_do_count,
            tasks_high_prio_count: row.tasks_high_prio_count,
        })
        .collect();

    Ok(Json(summaries))
}

/// Create a board owned by the authenticated user
///
/// # Errors
///
/// - `404 Not Found`: A requested member does not exist
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<BoardDetail>)> {
    req.validate()?;

    let board = board_lifecycle::create_board(
        &state.db,
        auth.user_id,
        board_lifecycle::CreateBoard {
            name: req.name,
            description: req.description,
            members: req.members,
        },
    )
    .await?;

    let detail = board_detail_payload(&state, board).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Board detail with members and nested tasks
///
/// # Errors
///
/// - `404 Not Found`: Board does not exist
/// - `403 Forbidden`: Requester is not a board participant
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardDetail>> {
    let board = board_lifecycle::authorize_board_view(&state.db, auth.user_id, board_id).await?;
    let detail = board_detail_payload(&state, board).await?;
    Ok(Json(detail))
}

/// Update a board; owner only
///
/// # Errors
///
/// - `404 Not Found`: Board or a requested member does not exist
/// - `403 Forbidden`: Requester is not a participant, or not the owner
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<BoardDetail>> {
    req.validate()?;

    let board = board_lifecycle::update_board(
        &state.db,
        auth.user_id,
        board_id,
        board_lifecycle::UpdateBoard {
            name: req.name,
            description: req.description,
            members: req.members,
        },
    )
    .await?;

    let detail = board_detail_payload(&state, board).await?;
    Ok(Json(detail))
}

/// Delete a board and everything on it; owner only
///
/// # Errors
///
/// - `404 Not Found`: Board does not exist
/// - `403 Forbidden`: Requester is not a participant, or not the owner
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    board_lifecycle::delete_board(&state.db, auth.user_id, board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
