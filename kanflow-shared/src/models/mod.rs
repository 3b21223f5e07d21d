/// Database models for Kanflow
///
/// This module contains all database models and their CRUD operations.
/// Authorization decisions never live here; they belong to
/// [`crate::auth::authorization`] and are composed with these operations by
/// the [`crate::lifecycle`] managers.
///
/// # Models
///
/// - `user`: User accounts
/// - `board`: Kanban boards and visibility queries
/// - `membership`: Board/user membership relation
/// - `task`: Tasks with priority, status, assignee, and reviewer
/// - `comment`: Task comments
///
/// # Example
///
/// ```no_run
/// use kanflow_shared::models::user::{CreateUser, User};
/// use kanflow_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "user@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         full_name: "Jane Doe".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod board;
pub mod comment;
pub mod membership;
pub mod task;
pub mod user;
