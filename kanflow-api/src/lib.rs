//! # Kanflow API Server Library
//!
//! This library provides the HTTP boundary of Kanflow. It translates the
//! typed outcomes of the shared core (allowed, denied, rejected, not
//! found) into transport responses and owns the per-operation response
//! shapes.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
