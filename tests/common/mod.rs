#![allow(dead_code)]

use axum::{Router, middleware, routing::get};
use axum_test::TestServer;
use std::sync::Arc;
use tokio::sync::mpsc;

use linkstats::api::handlers::health_handler;
use linkstats::api::middleware::auth;
use linkstats::api::routes::{protected_routes, public_routes};
use linkstats::application::event_worker::EventTracker;
use linkstats::application::services::auth_service::hash_token;
use linkstats::application::services::{AnalyticsService, AuthService};
use linkstats::domain::entities::OwnedLink;
use linkstats::domain::repositories::{EventRepository, LinkRepository, TokenRepository};
use linkstats::domain::track_request::TrackRequest;
use linkstats::infrastructure::memory::{
    MemoryEventRepository, MemoryLinkRepository, MemoryTokenRepository,
};
use linkstats::state::AppState;

pub const SIGNING_SECRET: &str = "test-signing-secret";

/// State over in-memory repositories, plus handles to inspect them.
pub struct TestContext {
    pub state: AppState,
    pub events: Arc<MemoryEventRepository>,
    pub links: Arc<MemoryLinkRepository>,
    pub tokens: Arc<MemoryTokenRepository>,
    pub receiver: mpsc::Receiver<TrackRequest>,
}

pub fn create_test_context() -> TestContext {
    create_test_context_with(Vec::new(), 100)
}

pub fn create_test_context_with(links: Vec<OwnedLink>, queue_capacity: usize) -> TestContext {
    let events = Arc::new(MemoryEventRepository::new());
    let links = Arc::new(MemoryLinkRepository::with_links(links));
    let tokens = Arc::new(MemoryTokenRepository::new());

    let event_repo: Arc<dyn EventRepository> = events.clone();
    let link_repo: Arc<dyn LinkRepository> = links.clone();
    let token_repo: Arc<dyn TokenRepository> = tokens.clone();

    let analytics_service = Arc::new(AnalyticsService::new(event_repo, link_repo));
    let auth_service = Arc::new(AuthService::new(token_repo, SIGNING_SECRET.to_string()));
    let (tracker, receiver) = EventTracker::channel(queue_capacity);

    let state = AppState::new(analytics_service, auth_service, tracker, false);

    TestContext {
        state,
        events,
        links,
        tokens,
        receiver,
    }
}

/// Application routes without rate limiting, which needs a peer address.
pub fn test_app(state: AppState) -> Router {
    let protected = protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", Router::new().merge(public_routes()).merge(protected))
        .with_state(state)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(test_app(state)).unwrap()
}

/// Stores a token for `owner_id` and returns the raw value.
pub async fn create_token(tokens: &MemoryTokenRepository, owner_id: i64, raw: &str) -> String {
    tokens
        .create_token(owner_id, "test-token", &hash_token(SIGNING_SECRET, raw))
        .await
        .unwrap();
    raw.to_string()
}

pub fn link(id: i64, owner_id: i64, title: &str, is_active: bool, clicks: i64) -> OwnedLink {
    OwnedLink::new(
        id,
        owner_id,
        title,
        format!("https://example.com/{id}"),
        "website",
        is_active,
        clicks,
    )
}
