//! Domain layer containing business entities and logic.
//!
//! This module has no dependencies on infrastructure or presentation layers.
//!
//! # Architecture
//!
//! - [`entities`] - Events, their value types and the owned-link read model
//! - [`repositories`] - Data access trait definitions
//! - [`user_agent`] - User-agent classification into device, browser and OS
//! - [`aggregation`] - Report types and in-process aggregation rules
//! - [`metrics`] - Conversion rate, growth rate and top link
//! - [`track_request`] - Queued tracking request model
//!
//! # Event Flow
//!
//! 1. HTTP handler builds a [`track_request::TrackRequest`] and hands it to the tracker
//! 2. The background worker passes it to [`crate::application::services::AnalyticsService`]
//! 3. The service classifies the user agent and appends the event via
//!    [`repositories::EventRepository`]

pub mod aggregation;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod track_request;
pub mod user_agent;
