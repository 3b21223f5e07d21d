/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use kanflow_api::{app::AppState, config::Config};
/// use kanflow_shared::auth::directory::PgUserDirectory;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let directory = Arc::new(PgUserDirectory::new(pool.clone()));
/// let state = AppState::new(pool, config, directory);
/// let app = kanflow_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use kanflow_shared::auth::{directory::UserDirectory, middleware as token_auth};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// User directory collaborator
    pub directory: Arc<dyn UserDirectory>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            directory,
        }
    }
}

/// Builds the complete Axum router
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                  # Liveness + DB ping (public)
/// └── /api/
///     ├── POST /registration                   # Register (public)
///     ├── POST /login                          # Login (public)
///     ├── GET  /email-check?email=             # User lookup (authenticated)
///     ├── GET|POST   /boards                   # Visible boards / create
///     ├── GET|PATCH|PUT|DELETE /boards/:id     # Detail / owner-only mutations
///     ├── GET|POST /tasks                      # Visible tasks / create
///     ├── GET  /tasks/assigned-to-me           # Personal listing
///     ├── GET  /tasks/reviewing                # Personal listing
///     ├── GET|PATCH|PUT|DELETE /tasks/:id      # Retrieve / update / delete
///     ├── GET|POST /tasks/:id/comments         # List / create comments
///     └── DELETE /tasks/:id/comments/:cid      # Author-or-owner delete
/// ```
///
/// # Middleware Stack
///
/// Applied bottom to top: request tracing (tower-http `TraceLayer`), CORS,
/// then bearer-token authentication on the protected subtree.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Credential endpoints (public)
    let public_routes = Router::new()
        .route("/registration", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Everything else requires a resolved bearer token
    let protected_routes = Router::new()
        .route("/email-check", get(routes::auth::email_check))
        .route(
            "/boards",
            get(routes::boards::list_boards).post(routes::boards::create_board),
        )
        .route(
            "/boards/:board_id",
            get(routes::boards::get_board)
                .patch(routes::boards::update_board)
                .put(routes::boards::update_board)
                .delete(routes::boards::delete_board),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/assigned-to-me", get(routes::tasks::assigned_to_me))
        .route("/tasks/reviewing", get(routes::tasks::reviewing))
        .route(
            "/tasks/:task_id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/tasks/:task_id/comments",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route(
            "/tasks/:task_id/comments/:comment_id",
            delete(routes::comments::delete_comment),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer-token authentication middleware layer
///
/// Resolves the Authorization header against the token store and injects
/// [`token_auth::AuthContext`] into request extensions.
async fn token_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let auth_context = token_auth::authenticate(&state.db, auth_header).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
