mod common;

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;

use linkstats::application::event_worker::run_event_worker;
use linkstats::domain::entities::{EventKind, EventPayload};
use linkstats::domain::track_request::{RequestMetadata, TrackRequest};

const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0) AppleWebKit Safari";
const CHROME_WINDOWS: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";

fn with_agent(request: TrackRequest, user_agent: &str) -> TrackRequest {
    request.with_metadata(RequestMetadata::new(
        Some("203.0.113.9".to_string()),
        Some(user_agent),
        None,
    ))
}

#[tokio::test]
async fn test_stats_requires_token() {
    let ctx = common::create_test_context();
    let server = common::test_server(ctx.state.clone());

    let response = server.get("/api/analytics/stats").await;

    response.assert_status_unauthorized();
    assert_eq!(response.header("www-authenticate"), "Bearer");
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "unauthorized"
    );
}

#[tokio::test]
async fn test_stats_rejects_unknown_token() {
    let ctx = common::create_test_context();
    common::create_token(&ctx.tokens, 7, "good-token").await;
    let server = common::test_server(ctx.state.clone());

    let response = server
        .get("/api/analytics/stats")
        .authorization_bearer("bad-token")
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_stats_rejects_revoked_token() {
    use linkstats::domain::repositories::TokenRepository;

    let ctx = common::create_test_context();
    let token = common::create_token(&ctx.tokens, 7, "soon-revoked").await;
    let id = ctx.tokens.list_tokens().await.unwrap()[0].id;
    ctx.tokens.revoke_token(id).await.unwrap();
    let server = common::test_server(ctx.state.clone());

    let response = server
        .get("/api/analytics/stats")
        .authorization_bearer(token)
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_stats_for_owner_without_activity() {
    let ctx = common::create_test_context();
    let token = common::create_token(&ctx.tokens, 7, "owner-7").await;
    let server = common::test_server(ctx.state.clone());

    let response = server
        .get("/api/analytics/stats")
        .authorization_bearer(token)
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "dailyStats": [],
        "topLinks": [],
        "geoStats": [],
        "deviceStats": { "deviceTypes": {}, "browsers": {}, "operatingSystems": {} },
        "totalClicks": 0,
        "profileViews": 0,
        "conversionRate": "0.0",
        "monthlyGrowth": 0,
        "topLink": "None yet",
        "totalLinks": 0,
        "activeLinks": 0
    }));
}

#[tokio::test]
async fn test_stats_validates_days() {
    let ctx = common::create_test_context();
    let token = common::create_token(&ctx.tokens, 7, "owner-7").await;
    let server = common::test_server(ctx.state.clone());

    for days in ["0", "366", "-5", "abc"] {
        let response = server
            .get("/api/analytics/stats")
            .add_query_param("days", days)
            .authorization_bearer(token.clone())
            .await;

        response.assert_status_bad_request();
        assert_eq!(
            response.json::<serde_json::Value>()["error"]["code"],
            "validation_error",
            "days={days}"
        );
    }

    server
        .get("/api/analytics/stats")
        .add_query_param("days", "365")
        .authorization_bearer(token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_stats_full_report() {
    let links = vec![
        common::link(1, 7, "Blog", true, 3),
        common::link(2, 7, "Shop", true, 7),
        common::link(3, 7, "Old", false, 0),
        common::link(4, 8, "Other owner", true, 50),
    ];
    let ctx = common::create_test_context_with(links, 100);
    let token = common::create_token(&ctx.tokens, 7, "owner-7").await;
    let service = ctx.state.analytics_service.clone();
    let at = Utc::now() - Duration::days(1);

    let click = |link_id| {
        with_agent(
            TrackRequest::new(7, Some(link_id), EventPayload::empty(EventKind::Click)),
            IPHONE,
        )
        .at(at)
    };
    for link_id in [2, 1, 2, 99] {
        service.record_event(click(link_id)).await.unwrap();
    }
    for _ in 0..3 {
        let view = TrackRequest::new(7, None, EventPayload::empty(EventKind::View));
        service
            .record_event(with_agent(view, CHROME_WINDOWS).at(at))
            .await
            .unwrap();
    }
    service
        .record_event(
            TrackRequest::new(
                7,
                None,
                EventPayload::Conversion {
                    product: Some("ebook".to_string()),
                    amount: Some(25.0),
                    currency: Some("USD".to_string()),
                },
            )
            .at(at),
        )
        .await
        .unwrap();
    service
        .record_event(TrackRequest::new(8, None, EventPayload::empty(EventKind::View)).at(at))
        .await
        .unwrap();

    let server = common::test_server(ctx.state.clone());
    let response = server
        .get("/api/analytics/stats")
        .add_query_param("days", "7")
        .authorization_bearer(token)
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();

    assert_eq!(
        json["dailyStats"],
        json!([{
            "date": at.date_naive().to_string(),
            "totalEvents": 8,
            "events": [
                { "type": "click", "count": 4 },
                { "type": "view", "count": 3 },
                { "type": "conversion", "count": 1 }
            ]
        }])
    );

    let top_links = json["topLinks"].as_array().unwrap();
    assert_eq!(top_links.len(), 2);
    assert_eq!(top_links[0]["linkId"], 2);
    assert_eq!(top_links[0]["title"], "Shop");
    assert_eq!(top_links[0]["type"], "website");
    assert_eq!(top_links[0]["clicks"], 2);
    assert_eq!(top_links[1]["linkId"], 1);
    assert_eq!(top_links[1]["clicks"], 1);

    assert_eq!(json["geoStats"], json!([]));
    assert_eq!(
        json["deviceStats"]["deviceTypes"],
        json!({ "desktop": 4, "mobile": 4 })
    );
    assert_eq!(
        json["deviceStats"]["browsers"],
        json!({ "Chrome": 3, "Safari": 4, "unknown": 1 })
    );

    assert_eq!(json["totalClicks"], 10);
    assert_eq!(json["profileViews"], 3);
    assert_eq!(json["conversionRate"], "333.3");
    assert_eq!(json["monthlyGrowth"], 100);
    assert_eq!(json["topLink"], "Shop");
    assert_eq!(json["totalLinks"], 3);
    assert_eq!(json["activeLinks"], 2);
}

#[tokio::test]
async fn test_tracked_event_reaches_report() {
    let ctx = common::create_test_context();
    let token = common::create_token(&ctx.tokens, 7, "owner-7").await;
    let service = ctx.state.analytics_service.clone();
    let worker = tokio::spawn(run_event_worker(ctx.receiver, Arc::clone(&service)));
    let server = common::test_server(ctx.state.clone());

    server
        .post("/api/analytics/track")
        .add_header("User-Agent", IPHONE)
        .json(&json!({ "owner_id": 7, "event_type": "view", "page": "/" }))
        .await
        .assert_status(axum::http::StatusCode::ACCEPTED);

    for _ in 0..50 {
        if !ctx.events.snapshot().await.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let response = server
        .get("/api/analytics/stats")
        .authorization_bearer(token)
        .await;
    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["profileViews"], 1);
    assert_eq!(json["monthlyGrowth"], 100);
    assert_eq!(json["deviceStats"]["deviceTypes"], json!({ "mobile": 1 }));

    worker.abort();
}

#[tokio::test]
async fn test_stats_storage_failure() {
    let ctx = common::create_test_context();
    let token = common::create_token(&ctx.tokens, 7, "owner-7").await;
    ctx.events.set_unavailable(true);
    let server = common::test_server(ctx.state.clone());

    let response = server
        .get("/api/analytics/stats")
        .authorization_bearer(token)
        .await;

    response.assert_status_internal_server_error();
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "internal_error"
    );
}

#[tokio::test]
async fn test_stats_top_link_without_clicks_is_first_link() {
    let links = vec![
        common::link(1, 7, "Blog", true, 0),
        common::link(2, 7, "Shop", true, 0),
    ];
    let ctx = common::create_test_context_with(links, 100);
    let token = common::create_token(&ctx.tokens, 7, "owner-7").await;
    let server = common::test_server(ctx.state.clone());

    let response = server
        .get("/api/analytics/stats")
        .authorization_bearer(token)
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["topLink"], "Blog");
    assert_eq!(json["totalLinks"], 2);
    assert_eq!(json["totalClicks"], 0);
}
