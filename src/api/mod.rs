//! REST API layer for event tracking and analytics reports.
//!
//! Translates HTTP requests into [`crate::application`] calls and formats
//! responses. Reports use camelCase JSON; errors use the shared
//! `{ "error": { "code", "message", "details" } }` body.
//!
//! # Modules
//!
//! - [`dto`] - Request and response bodies
//! - [`handlers`] - Track, stats and health handlers
//! - [`middleware`] - Authentication, rate limiting and tracing
//! - [`routes`] - Public and protected route groups

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
