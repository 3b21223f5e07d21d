/// User directory collaborator
///
/// Lookups of "the set of all users" go through this trait instead of a
/// global: callers receive a directory at construction time, which keeps
/// the email-check and registration flows testable with an in-memory
/// implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{User, UserProfile};

/// Directory of user accounts
///
/// Implementations must be cheap to clone behind an `Arc` and safe to share
/// across request handlers.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up a user's public profile by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, sqlx::Error>;

    /// Checks whether a user account exists
    async fn exists(&self, user_id: Uuid) -> Result<bool, sqlx::Error>;
}

/// PostgreSQL-backed user directory
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Creates a directory over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, sqlx::Error> {
        let user = User::find_by_email(&self.pool, email).await?;
        Ok(user.map(|u| u.profile()))
    }

    async fn exists(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        User::exists(&self.pool, user_id).await
    }
}
