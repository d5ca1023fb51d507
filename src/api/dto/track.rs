//! DTOs for the event tracking endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::EventPayload;
use crate::domain::track_request::{RequestMetadata, TrackRequest};

/// Event reported by a public profile page.
///
/// `event_type` selects the payload variant; payload fields sit next to it
/// at the top level:
///
/// ```json
/// { "owner_id": 4, "link_id": 9, "event_type": "click", "link_title": "Shop" }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct TrackEventRequest {
    #[validate(range(min = 1, message = "owner_id must be a positive integer"))]
    pub owner_id: i64,

    #[validate(range(min = 1, message = "link_id must be a positive integer"))]
    pub link_id: Option<i64>,

    /// Recording time is used when absent.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub payload: EventPayload,
}

impl TrackEventRequest {
    pub fn into_track_request(self, metadata: RequestMetadata) -> TrackRequest {
        TrackRequest {
            owner_id: self.owner_id,
            link_id: self.link_id,
            payload: self.payload,
            metadata,
            occurred_at: self.occurred_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackEventResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EventKind;

    #[test]
    fn test_flattened_payload() {
        let request: TrackEventRequest = serde_json::from_str(
            r#"{"owner_id":4,"event_type":"conversion","product":"ebook","amount":25.5,"currency":"USD"}"#,
        )
        .unwrap();

        assert_eq!(request.owner_id, 4);
        assert_eq!(request.link_id, None);
        assert_eq!(
            request.payload,
            EventPayload::Conversion {
                product: Some("ebook".to_string()),
                amount: Some(25.5),
                currency: Some("USD".to_string()),
            }
        );
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result =
            serde_json::from_str::<TrackEventRequest>(r#"{"owner_id":4,"event_type":"purchase"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_event_type_is_rejected() {
        let result = serde_json::from_str::<TrackEventRequest>(r#"{"owner_id":4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_of_ids() {
        let request: TrackEventRequest =
            serde_json::from_str(r#"{"owner_id":0,"link_id":-1,"event_type":"view"}"#).unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("owner_id"));
        assert!(fields.contains_key("link_id"));
    }

    #[test]
    fn test_into_track_request() {
        let request: TrackEventRequest = serde_json::from_str(
            r#"{"owner_id":2,"link_id":5,"occurred_at":"2024-01-01T23:59:59Z","event_type":"click"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let track = request.into_track_request(RequestMetadata::default());

        assert_eq!(track.kind(), EventKind::Click);
        assert_eq!(track.link_id, Some(5));
        assert_eq!(
            track.occurred_at.unwrap().to_rfc3339(),
            "2024-01-01T23:59:59+00:00"
        );
    }
}
