//! Track request model for asynchronous event recording.

use chrono::{DateTime, Utc};

use crate::domain::entities::{EventKind, EventPayload, GeoInfo};

/// Request metadata captured by the HTTP layer.
///
/// Every field falls back to an empty string when the header or address is
/// missing, so recording never fails on absent metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: String,
    pub geo: GeoInfo,
}

impl RequestMetadata {
    pub fn new(
        ip_address: Option<String>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Self {
        Self {
            ip_address: ip_address.unwrap_or_default(),
            user_agent: user_agent.unwrap_or_default().to_string(),
            referrer: referrer.unwrap_or_default().to_string(),
            geo: GeoInfo::default(),
        }
    }

    pub fn with_geo(mut self, geo: GeoInfo) -> Self {
        self.geo = geo;
        self
    }
}

/// An interaction waiting to be recorded.
///
/// Built by the track handler and sent through the event queue to
/// [`crate::application::event_worker::run_event_worker`]. The device
/// attributes are derived later, from `metadata.user_agent`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRequest {
    pub owner_id: i64,
    pub link_id: Option<i64>,
    pub payload: EventPayload,
    pub metadata: RequestMetadata,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl TrackRequest {
    pub fn new(owner_id: i64, link_id: Option<i64>, payload: EventPayload) -> Self {
        Self {
            owner_id,
            link_id,
            payload,
            metadata: RequestMetadata::default(),
            occurred_at: None,
        }
    }

    pub fn with_metadata(mut self, metadata: RequestMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
