//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::event_worker::EventTracker;
use crate::application::services::{AnalyticsService, AuthService};
use crate::domain::repositories::{EventRepository, LinkRepository, TokenRepository};

/// Analytics service over type-erased repositories.
pub type SharedAnalyticsService = Arc<AnalyticsService<dyn EventRepository, dyn LinkRepository>>;

pub type SharedAuthService = Arc<AuthService<dyn TokenRepository>>;

#[derive(Clone)]
pub struct AppState {
    pub analytics_service: SharedAnalyticsService,
    pub auth_service: SharedAuthService,
    pub event_tracker: EventTracker,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for the client address.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        analytics_service: SharedAnalyticsService,
        auth_service: SharedAuthService,
        event_tracker: EventTracker,
        behind_proxy: bool,
    ) -> Self {
        Self {
            analytics_service,
            auth_service,
            event_tracker,
            behind_proxy,
        }
    }
}
