/// Comment endpoints
///
/// Listing and creating require board participation via the task; deletion
/// additionally requires being the comment's author or the board owner.
///
/// # Endpoints
///
/// - `GET    /api/tasks/:task_id/comments` - List comments, oldest first
/// - `POST   /api/tasks/:task_id/comments` - Add comment
/// - `DELETE /api/tasks/:task_id/comments/:comment_id` - Delete comment

use crate::{app::AppState, error::ApiError, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use kanflow_shared::{
    auth::middleware::AuthContext,
    lifecycle::{comment as comment_lifecycle, task as task_lifecycle},
    models::comment::Comment,
    models::user::User,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Comment text
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// Comment payload with the author's display name
#[derive(Debug, Serialize)]
pub struct CommentDetail {
    /// Comment ID
    pub id: Uuid,

    /// Comment text
    pub content: String,

    /// Author display name
    pub author: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// List a task's comments, oldest first
///
/// # Errors
///
/// - `404 Not Found`: Task does not exist
/// - `403 Forbidden`: Requester is not a board participant
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentDetail>>> {
    let task = task_lifecycle::authorize_task_view(&state.db, auth.user_id, task_id).await?;

    let comments = Comment::list_by_task(&state.db, task.id).await?;
    let details = comments
        .into_iter()
        .map(|c| CommentDetail {
            id: c.id,
            content: c.content,
            author: c.author,
            created_at: c.created_at,
        })
        .collect();

    Ok(Json(details))
}

/// Add a comment to a task
///
/// # Errors
///
/// - `404 Not Found`: Task does not exist
/// - `403 Forbidden`: Requester is not a board participant
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentDetail>)> {
    req.validate()?;

    let comment =
        comment_lifecycle::add_comment(&state.db, auth.user_id, task_id, &req.content).await?;

    let author = User::find_by_id(&state.db, comment.author_id)
        .await?
        .map(|u| u.full_name)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(CommentDetail {
            id: comment.id,
            content: comment.content,
            author,
            created_at: comment.created_at,
        }),
    ))
}

/// Delete a comment; author or board owner only
///
/// # Errors
///
/// - `404 Not Found`: Comment does not exist on this task
/// - `403 Forbidden`: Requester is not a participant, or is a participant
///   who is neither the author nor the board owner
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    comment_lifecycle::delete_comment(&state.db, auth.user_id, task_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
