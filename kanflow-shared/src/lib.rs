//! # Kanflow Shared Library
//!
//! This crate contains the models, authorization engine, and lifecycle
//! logic shared by the Kanflow API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Credential service, bearer-token middleware, and the board
//!   authorization engine
//! - `lifecycle`: Transactional authorize-then-mutate managers for boards,
//!   tasks, and comments
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod lifecycle;
pub mod models;

/// Current version of the Kanflow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
