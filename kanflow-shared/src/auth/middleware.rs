/// Bearer-token authentication for Axum
///
/// The API layer wraps protected routes in a middleware fn that calls
/// [`authenticate`] with the request's `Authorization` header and injects
/// the resulting [`AuthContext`] into request extensions.
///
/// Both `Token <key>` (the scheme the original frontend sends) and
/// `Bearer <key>` are accepted.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use kanflow_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::token::AuthToken;

/// Authentication context added to request extensions after a successful
/// token resolution
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

/// Error type for authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header present
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not a recognized scheme
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token does not resolve to a user
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Database error during token resolution
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolves an `Authorization` header value to an [`AuthContext`]
///
/// # Errors
///
/// - [`AuthError::InvalidFormat`] when the scheme is neither `Token` nor
///   `Bearer`
/// - [`AuthError::InvalidToken`] when the key is unknown
pub async fn authenticate(pool: &PgPool, authorization: &str) -> Result<AuthContext, AuthError> {
    let key = token_key(authorization)?;

    let user_id = AuthToken::resolve(pool, key)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    Ok(AuthContext { user_id })
}

/// Extracts the token key from an Authorization header value
fn token_key(authorization: &str) -> Result<&str, AuthError> {
    authorization
        .strip_prefix("Token ")
        .or_else(|| authorization.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            AuthError::InvalidFormat("Expected 'Token <key>' or 'Bearer <key>'".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key_accepts_both_schemes() {
        assert_eq!(token_key("Token abc123").unwrap(), "abc123");
        assert_eq!(token_key("Bearer abc123").unwrap(), "abc123");
    }

    #[test]
    fn test_token_key_rejects_unknown_scheme_and_empty_key() {
        assert!(matches!(
            token_key("Basic dXNlcjpwYXNz").unwrap_err(),
            AuthError::InvalidFormat(_)
        ));
        assert!(matches!(
            token_key("Token ").unwrap_err(),
            AuthError::InvalidFormat(_)
        ));
    }
}
