/// Opaque bearer-token credential service
///
/// Kanflow issues one opaque token per user: 32 random bytes, hex-encoded
/// to 64 characters. Issuance is idempotent — logging in again returns the
/// same token — which is why tokens are stored as-is rather than hashed
/// (a hashed token could not be re-issued). Tokens carry no claims; every
/// request resolves the token to a user ID against the `auth_tokens` table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth_tokens (
///     user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     token VARCHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use kanflow_shared::auth::token::AuthToken;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let token = AuthToken::get_or_create(&pool, user_id).await?;
/// let resolved = AuthToken::resolve(&pool, &token.token).await?;
/// assert_eq!(resolved, Some(user_id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Length of a token in bytes before hex encoding
const TOKEN_BYTES: usize = 32;

/// Length of an encoded token in characters
pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

/// A user's bearer token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthToken {
    /// Owning user (one token per user)
    pub user_id: Uuid,

    /// Opaque token key, 64 hex characters
    pub token: String,

    /// When the token was first issued
    pub created_at: DateTime<Utc>,
}

/// Generates a fresh token key
///
/// 32 bytes from the thread-local CSPRNG, hex-encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl AuthToken {
    /// Returns the user's token, issuing one on first use
    ///
    /// Idempotent per user: concurrent callers and repeated logins all
    /// observe the same token. A freshly generated key is only persisted
    /// when the user has no token yet.
    pub async fn get_or_create(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let candidate = generate_token();

        // The no-op DO UPDATE makes RETURNING yield the existing row on
        // conflict instead of discarding it.
        sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (user_id, token)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET token = auth_tokens.token
            RETURNING user_id, token, created_at
            "#,
        )
        .bind(user_id)
        .bind(candidate)
        .fetch_one(executor)
        .await
    }

    /// Resolves a presented token key to a user ID
    ///
    /// Returns `None` for unknown tokens.
    pub async fn resolve(
        executor: impl PgExecutor<'_>,
        token: &str,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM auth_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }
}
