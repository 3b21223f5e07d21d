/// Authentication and authorization for Kanflow
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`token`]: Opaque per-user bearer tokens with idempotent issuance
/// - [`middleware`]: Authorization-header resolution for Axum
/// - [`authorization`]: The board authorization engine (membership oracle
///   and access guards)
/// - [`directory`]: Injected user-directory collaborator
///
/// # Example
///
/// ```no_run
/// use kanflow_shared::auth::password::{hash_password, verify_password};
/// use kanflow_shared::auth::token::AuthToken;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = AuthToken::get_or_create(&pool, user_id).await?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod directory;
pub mod middleware;
pub mod password;
pub mod token;
