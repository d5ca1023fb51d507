//! Analytics event entity and its value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Kind of interaction an event records.
///
/// Closed set; the lowercase string form is used on the wire and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    View,
    Conversion,
    Signup,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::View => "view",
            EventKind::Conversion => "conversion",
            EventKind::Signup => "signup",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "click" => Ok(EventKind::Click),
            "view" => Ok(EventKind::View),
            "conversion" => Ok(EventKind::Conversion),
            "signup" => Ok(EventKind::Signup),
            other => Err(AppError::bad_request(
                "Unknown event type",
                json!({ "event_type": other }),
            )),
        }
    }
}

/// Event-specific data, one variant per [`EventKind`].
///
/// The event kind is derived from the variant, so a click can never carry
/// a conversion payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "lowercase")]
pub enum EventPayload {
    Click {
        link_title: Option<String>,
        link_url: Option<String>,
    },
    View {
        page: Option<String>,
    },
    Conversion {
        product: Option<String>,
        amount: Option<f64>,
        currency: Option<String>,
    },
    Signup {
        plan: Option<String>,
    },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Click { .. } => EventKind::Click,
            EventPayload::View { .. } => EventKind::View,
            EventPayload::Conversion { .. } => EventKind::Conversion,
            EventPayload::Signup { .. } => EventKind::Signup,
        }
    }

    /// Payload with no optional data for the given kind.
    pub fn empty(kind: EventKind) -> Self {
        match kind {
            EventKind::Click => EventPayload::Click {
                link_title: None,
                link_url: None,
            },
            EventKind::View => EventPayload::View { page: None },
            EventKind::Conversion => EventPayload::Conversion {
                product: None,
                amount: None,
                currency: None,
            },
            EventKind::Signup => EventPayload::Signup { plan: None },
        }
    }
}

/// Coarse device category derived from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Desktop => "desktop",
            DeviceClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visitor details captured from the request at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorInfo {
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: String,
}

/// Geographic location of the visitor. Fields stay empty when unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoInfo {
    pub country: String,
    pub region: String,
    pub city: String,
}

/// Device attributes derived from the user agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_class: DeviceClass,
    pub browser: String,
    pub os: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            device_class: DeviceClass::Unknown,
            browser: "unknown".to_string(),
            os: "unknown".to_string(),
        }
    }
}

/// A recorded interaction. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub owner_id: i64,
    pub link_id: Option<i64>,
    pub payload: EventPayload,
    pub visitor: VisitorInfo,
    pub geo: GeoInfo,
    pub device: DeviceInfo,
    pub occurred_at: DateTime<Utc>,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// Input data for appending a new event.
///
/// Built by the analytics service after the user agent has been classified;
/// the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub owner_id: i64,
    pub link_id: Option<i64>,
    pub payload: EventPayload,
    pub visitor: VisitorInfo,
    pub geo: GeoInfo,
    pub device: DeviceInfo,
    pub occurred_at: DateTime<Utc>,
}

impl NewEvent {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Attaches a store-assigned id.
    pub fn into_event(self, id: i64) -> Event {
        Event {
            id,
            owner_id: self.owner_id,
            link_id: self.link_id,
            payload: self.payload,
            visitor: self.visitor,
            geo: self.geo,
            device: self.device,
            occurred_at: self.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_round_trips_through_str() {
        for kind in [
            EventKind::Click,
            EventKind::View,
            EventKind::Conversion,
            EventKind::Signup,
        ] {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_event_kind_rejects_unknown() {
        let err = "purchase".parse::<EventKind>().unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_payload_kind_follows_variant() {
        let payload = EventPayload::Conversion {
            product: Some("ebook".to_string()),
            amount: Some(2500.0),
            currency: Some("NGN".to_string()),
        };
        assert_eq!(payload.kind(), EventKind::Conversion);
        assert_eq!(EventPayload::empty(EventKind::View).kind(), EventKind::View);
    }

    #[test]
    fn test_payload_serializes_with_event_type_tag() {
        let payload = EventPayload::Click {
            link_title: Some("Shop".to_string()),
            link_url: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["event_type"], "click");
        assert_eq!(value["link_title"], "Shop");
    }

    #[test]
    fn test_payload_missing_optional_fields() {
        let payload: EventPayload = serde_json::from_str(r#"{"event_type":"signup"}"#).unwrap();
        assert_eq!(payload, EventPayload::Signup { plan: None });
    }

    #[test]
    fn test_new_event_into_event_keeps_fields() {
        let now = Utc::now();
        let new_event = NewEvent {
            owner_id: 7,
            link_id: Some(3),
            payload: EventPayload::empty(EventKind::Click),
            visitor: VisitorInfo::default(),
            geo: GeoInfo::default(),
            device: DeviceInfo::default(),
            occurred_at: now,
        };

        let event = new_event.into_event(42);
        assert_eq!(event.id, 42);
        assert_eq!(event.owner_id, 7);
        assert_eq!(event.link_id, Some(3));
        assert_eq!(event.kind(), EventKind::Click);
        assert_eq!(event.occurred_at, now);
        assert_eq!(event.device.browser, "unknown");
    }
}
