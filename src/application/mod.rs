//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers and the background worker.
//!
//! # Available Services
//!
//! - [`services::analytics_service::AnalyticsService`] - Event recording and reports
//! - [`services::auth_service::AuthService`] - API token authentication
//!
//! # Background Tasks
//!
//! - [`event_worker`] - Event queue, worker loop and retention purge

pub mod event_worker;
pub mod services;
