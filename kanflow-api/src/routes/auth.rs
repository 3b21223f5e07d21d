/// Credential endpoints
///
/// Registration and login issue the per-user opaque token; email-check lets
/// an authenticated user verify an address before inviting it to a board.
///
/// # Endpoints
///
/// - `POST /api/registration` - Register new user
/// - `POST /api/login` - Login and get token
/// - `GET  /api/email-check?email=` - Look up a user by email

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use kanflow_shared::{
    auth::password,
    auth::token::AuthToken,
    models::user::{CreateUser, User, UserProfile},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub fullname: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Password confirmation; must match `password`
    pub repeated_password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Token payload returned by registration and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Opaque bearer token
    pub token: String,

    /// User ID
    pub user_id: String,

    /// Email address
    pub email: String,

    /// Display name
    pub fullname: String,
}

/// Email-check query parameters
#[derive(Debug, Deserialize)]
pub struct EmailCheckQuery {
    /// Address to look up
    pub email: Option<String>,
}

/// Register a new user
///
/// Creates the account and returns the freshly issued token so the client
/// is logged in immediately.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed or passwords differ
/// - `409 Conflict`: Email already registered (case-insensitive)
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    if req.password != req.repeated_password {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "repeated_password".to_string(),
            message: "Passwords do not match".to_string(),
        }]));
    }

    if state.directory.find_by_email(&req.email).await?.is_some() {
        return Err(ApiError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            full_name: req.fullname,
        },
    )
    .await?;

    let token = AuthToken::get_or_create(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: token.token,
            user_id: user.id.to_string(),
            email: user.email,
            fullname: user.full_name,
        }),
    ))
}

/// Login with email and password
///
/// Token issuance is idempotent: logging in again returns the same token.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable
///   by design)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = AuthToken::get_or_create(&state.db, user.id).await?;

    Ok(Json(AuthResponse {
        token: token.token,
        user_id: user.id.to_string(),
        email: user.email,
        fullname: user.full_name,
    }))
}

/// Look up a user by email before inviting them to a board
///
/// # Errors
///
/// - `400 Bad Request`: Missing `email` query parameter
/// - `404 Not Found`: No user with that address
pub async fn email_check(
    State(state): State<AppState>,
    Query(query): Query<EmailCheckQuery>,
) -> ApiResult<Json<UserProfile>> {
    let email = query
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'email' is required".to_string()))?;

    let profile = state
        .directory
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(profile))
}
