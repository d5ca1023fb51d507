//! Handler for the analytics report.

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::api::dto::stats::{StatsQueryParams, StatsResponse};
use crate::api::middleware::auth::AuthenticatedOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the dashboard report for the authenticated owner.
///
/// # Endpoint
///
/// `GET /api/analytics/stats`
///
/// # Query Parameters
///
/// - `days` (optional): lookback window in days (default: 30, range: 1..=365)
///
/// # Response
///
/// ```json
/// {
///   "dailyStats": [{ "date": "2024-01-01", "totalEvents": 3, "events": [{ "type": "view", "count": 3 }] }],
///   "topLinks": [],
///   "geoStats": [],
///   "deviceStats": { "deviceTypes": {}, "browsers": {}, "operatingSystems": {} },
///   "totalClicks": 0,
///   "profileViews": 3,
///   "conversionRate": "0.0",
///   "monthlyGrowth": 100,
///   "topLink": "None yet",
///   "totalLinks": 0,
///   "activeLinks": 0
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if `days` is not a number or out of range.
/// Returns 500 Internal Server Error if any query fails.
pub async fn stats_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedOwner(owner_id)): Extension<AuthenticatedOwner>,
    params: Result<Query<StatsQueryParams>, QueryRejection>,
) -> Result<Json<StatsResponse>, AppError> {
    let Query(params) = params?;

    let summary = state
        .analytics_service
        .get_stats(owner_id, params.days())
        .await?;

    Ok(Json(summary.into()))
}
