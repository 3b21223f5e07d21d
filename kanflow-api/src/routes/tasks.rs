/// Task endpoints
///
/// Task mutations run through the task lifecycle manager, which authorizes
/// against the task's board and validates assignee/reviewer membership.
/// The personal listings (`assigned-to-me`, `reviewing`) are filtered by
/// the authenticated user and need no board guard.
///
/// # Endpoints
///
/// - `GET    /api/tasks` - Tasks on boards the user participates in
/// - `POST   /api/tasks` - Create task
/// - `GET    /api/tasks/:task_id` - Retrieve task
/// - `PATCH  /api/tasks/:task_id` - Update task (PUT accepted too)
/// - `DELETE /api/tasks/:task_id` - Delete task
/// - `GET    /api/tasks/assigned-to-me` - Tasks the user is assigned to
/// - `GET    /api/tasks/reviewing` - Tasks the user reviews

use std::collections::HashMap;

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use kanflow_shared::{
    auth::middleware::AuthContext,
    lifecycle::task as task_lifecycle,
    models::comment::Comment,
    models::task::{Task, TaskPriority, TaskStatus},
    models::user::{User, UserProfile},
};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Target board
    pub board: Uuid,

    /// Title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Status (defaults to to-do)
    #[serde(default)]
    pub status: TaskStatus,

    /// Priority (defaults to medium)
    #[serde(default)]
    pub priority: TaskPriority,

    /// Assignee; must be a participant of the target board
    pub assignee_id: Option<Uuid>,

    /// Reviewer; must be a participant of the target board
    pub reviewer_id: Option<Uuid>,

    /// Due date
    pub due_date: Option<NaiveDate>,
}

/// Update task request
///
/// Absent fields are left unchanged. For the nullable fields an explicit
/// `null` clears the value, which is why they deserialize into a nested
/// option.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// Proposed board; any board other than the task's own is rejected
    pub board: Option<Uuid>,

    /// New assignee (`null` unassigns)
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,

    /// New reviewer (`null` unassigns)
    #[serde(default, deserialize_with = "double_option")]
    pub reviewer_id: Option<Option<Uuid>>,

    /// New due date (`null` clears)
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Task payload with denormalized participant profiles
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    /// Task ID
    pub id: Uuid,

    /// Owning board
    pub board: Uuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Due date
    pub due_date: Option<NaiveDate>,

    /// Assignee profile, if assigned
    pub assignee: Option<UserProfile>,

    /// Reviewer profile, if set
    pub reviewer: Option<UserProfile>,

    /// Number of comments on the task
    pub comments_count: i64,
}

/// Distinguishes a field set to `null` from an absent field
///
/// With `#[serde(default)]`, a missing field stays `None` while a present
/// `null` becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Builds detail payloads for a set of tasks
///
/// Batches the profile and comment-count lookups so a listing costs two
/// queries regardless of length.
pub(crate) async fn task_details(
    db: &PgPool,
    tasks: Vec<Task>,
) -> Result<Vec<TaskDetail>, sqlx::Error> {
    let mut user_ids: Vec<Uuid> = tasks
        .iter()
        .flat_map(|t| [t.assignee_id, t.reviewer_id])
        .flatten()
        .collect();
    user_ids.sort();
    user_ids.dedup();

    let profiles: HashMap<Uuid, UserProfile> = User::profiles_by_ids(db, &user_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
    let counts: HashMap<Uuid, i64> = Comment::counts_by_tasks(db, &task_ids)
        .await?
        .into_iter()
        .map(|c| (c.task_id, c.count))
        .collect();

    Ok(tasks
        .into_iter()
        .map(|task| TaskDetail {
            comments_count: counts.get(&task.id).copied().unwrap_or(0),
            assignee: task.assignee_id.and_then(|id| profiles.get(&id).cloned()),
            reviewer: task.reviewer_id.and_then(|id| profiles.get(&id).cloned()),
            id: task.id,
            board: task.board_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
        })
        .collect())
}

/// Builds the detail payload for a single task
pub(crate) async fn task_detail(db: &PgPool, task: Task) -> Result<TaskDetail, sqlx::Error> {
    let mut details = task_details(db, vec![task]).await?;
    Ok(details.remove(0))
}

/// Create a task on a board
///
/// # Errors
///
/// - `404 Not Found`: Target board does not exist
/// - `403 Forbidden`: Requester is not a board participant
/// - `400 Bad Request`: Assignee/reviewer is not a board participant
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskDetail>)> {
    req.validate()?;

    let task = task_lifecycle::create_task(
        &state.db,
        auth.user_id,
        task_lifecycle::CreateTask {
            board_id: req.board,
            title: req.title,
            description: req.description,
            priority: req.priority,
            status: req.status,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
            due_date: req.due_date,
        },
    )
    .await?;

    let detail = task_detail(&state.db, task).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Update a task
///
/// # Errors
///
/// - `404 Not Found`: Task does not exist
/// - `403 Forbidden`: Requester is not a board participant
/// - `400 Bad Request`: Board change attempted, or assignee/reviewer is
///   not a board participant
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskDetail>> {
    req.validate()?;

    let task = task_lifecycle::update_task(
        &state.db,
        auth.user_id,
        task_id,
        task_lifecycle::TaskPatch {
            title: req.title,
            description: req.description,
            priority: req.priority,
            status: req.status,
            board_id: req.board,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
            due_date: req.due_date,
        },
    )
    .await?;

    let detail = task_detail(&state.db, task).await?;
    Ok(Json(detail))
}

/// Delete a task
///
/// # Errors
///
/// - `404 Not Found`: Task does not exist
/// - `403 Forbidden`: Requester is not a board participant
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    task_lifecycle::delete_task(&state.db, auth.user_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Tasks on every board the authenticated user participates in
///
/// Visibility filter, not an authorization failure: tasks on other boards
/// are simply absent.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskDetail>>> {
    let tasks = Task::list_visible(&state.db, auth.user_id).await?;
    let details = task_details(&state.db, tasks).await?;
    Ok(Json(details))
}

/// Retrieve a single task
///
/// # Errors
///
/// - `404 Not Found`: Task does not exist
/// - `403 Forbidden`: Requester is not a board participant
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskDetail>> {
    let task = task_lifecycle::authorize_task_view(&state.db, auth.user_id, task_id).await?;
    let detail = task_detail(&state.db, task).await?;
    Ok(Json(detail))
}

/// Tasks where the authenticated user is the assignee
pub async fn assigned_to_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskDetail>>> {
    let tasks = Task::list_assigned_to(&state.db, auth.user_id).await?;
    let details = task_details(&state.db, tasks).await?;
    Ok(Json(details))
}

/// Tasks where the authenticated user is the reviewer
pub async fn reviewing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskDetail>>> {
    let tasks = Task::list_reviewing(&state.db, auth.user_id).await?;
    let details = task_details(&state.db, tasks).await?;
    Ok(Json(details))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        // Absent fields stay untouched.
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"title": "New title"}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("New title"));
        assert_eq!(req.assignee_id, None);

        // Explicit null clears the assignee.
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        assert_eq!(req.assignee_id, Some(None));

        // A value sets it.
        let id = Uuid::new_v4();
        let req: UpdateTaskRequest =
            serde_json::from_str(&format!(r#"{{"assignee_id": "{id}"}}"#)).unwrap();
        assert_eq!(req.assignee_id, Some(Some(id)));
    }

    #[test]
    fn test_create_request_defaults() {
        let board = Uuid::new_v4();
        let req: CreateTaskRequest =
            serde_json::from_str(&format!(r#"{{"board": "{board}", "title": "T"}}"#)).unwrap();

        assert_eq!(req.status, TaskStatus::ToDo);
        assert_eq!(req.priority, TaskPriority::Medium);
        assert!(req.description.is_empty());
        assert!(req.assignee_id.is_none());
    }
}
