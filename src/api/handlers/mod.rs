//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod stats;
pub mod track;

pub use health::health_handler;
pub use stats::stats_handler;
pub use track::track_handler;
