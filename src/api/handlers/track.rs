//! Handler for the event tracking endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
};
use validator::Validate;

use crate::api::dto::track::{TrackEventRequest, TrackEventResponse};
use crate::domain::track_request::RequestMetadata;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::ClientIp;

/// Accepts an interaction event from a public profile page.
///
/// # Endpoint
///
/// `POST /api/analytics/track`
///
/// # Request Flow
///
/// 1. Parse and validate the JSON body
/// 2. Capture client address, `User-Agent` and `Referer`
/// 3. Queue the event for the background worker (non-blocking)
/// 4. Return 202 Accepted
///
/// The response does not depend on the storage outcome. A full queue drops
/// the event and still answers 202.
///
/// # Errors
///
/// Returns 400 Bad Request for malformed JSON, an unknown `event_type` or
/// non-positive ids.
pub async fn track_handler(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    headers: HeaderMap,
    payload: Result<Json<TrackEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TrackEventResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let metadata = RequestMetadata::new(
        client_ip,
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    state
        .event_tracker
        .track(payload.into_track_request(metadata));

    Ok((
        StatusCode::ACCEPTED,
        Json(TrackEventResponse {
            message: "Event accepted",
        }),
    ))
}
