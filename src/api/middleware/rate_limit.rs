//! Per-client rate limiting using the token bucket algorithm.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::state::AppState;

/// Public limit: one token every 2 seconds, burst of 100.
const PUBLIC_PERIOD_SECS: u64 = 2;
const PUBLIC_BURST: u32 = 100;

/// Authenticated limit: one token per second, burst of 10.
const SECURE_PERIOD_SECS: u64 = 1;
const SECURE_BURST: u32 = 10;

fn governor_layer<K: KeyExtractor>(
    key_extractor: K,
    period_secs: u64,
    burst: u32,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(period_secs)
            .burst_size(burst)
            .key_extractor(key_extractor)
            .finish()
            .expect("rate limit period and burst are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Applies the public rate limit to `router`.
///
/// With `behind_proxy` the client is keyed by `X-Forwarded-For` /
/// `X-Real-IP` / `Forwarded`, otherwise by the peer socket address.
/// Requests over the limit receive `429 Too Many Requests`.
pub fn public(router: Router<AppState>, behind_proxy: bool) -> Router<AppState> {
    if behind_proxy {
        router.layer(governor_layer(
            SmartIpKeyExtractor,
            PUBLIC_PERIOD_SECS,
            PUBLIC_BURST,
        ))
    } else {
        router.layer(governor_layer(
            PeerIpKeyExtractor,
            PUBLIC_PERIOD_SECS,
            PUBLIC_BURST,
        ))
    }
}

/// Applies the stricter limit used for authenticated report endpoints.
pub fn secure(router: Router<AppState>, behind_proxy: bool) -> Router<AppState> {
    if behind_proxy {
        router.layer(governor_layer(
            SmartIpKeyExtractor,
            SECURE_PERIOD_SECS,
            SECURE_BURST,
        ))
    } else {
        router.layer(governor_layer(
            PeerIpKeyExtractor,
            SECURE_PERIOD_SECS,
            SECURE_BURST,
        ))
    }
}
