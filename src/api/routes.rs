//! API route configuration.

use crate::api::handlers::{stats_handler, track_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes open to anonymous profile visitors.
///
/// # Endpoints
///
/// - `POST /analytics/track` - Queue an interaction event
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/analytics/track", post(track_handler))
}

/// Routes that require Bearer token authentication.
///
/// # Endpoints
///
/// - `GET /analytics/stats` - Dashboard report for the token's owner
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/analytics/stats", get(stats_handler))
}
