/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, and email lookup
/// - `boards`: Board overview and owner-only mutations
/// - `tasks`: Task CRUD and personal listings
/// - `comments`: Task comments

pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod tasks;
