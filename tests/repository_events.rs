use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use linkstats::domain::entities::{
    DeviceClass, DeviceInfo, EventKind, EventPayload, GeoInfo, NewEvent, VisitorInfo,
};
use linkstats::domain::repositories::{EventRepository, LinkRepository};
use linkstats::infrastructure::persistence::{PgEventRepository, PgLinkRepository};

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn new_event(owner_id: i64, link_id: Option<i64>, kind: EventKind, at: DateTime<Utc>) -> NewEvent {
    NewEvent {
        owner_id,
        link_id,
        payload: EventPayload::empty(kind),
        visitor: VisitorInfo {
            ip_address: "203.0.113.1".to_string(),
            user_agent: "test-agent".to_string(),
            referrer: String::new(),
        },
        geo: GeoInfo::default(),
        device: DeviceInfo {
            device_class: DeviceClass::Desktop,
            browser: "Chrome".to_string(),
            os: "Linux".to_string(),
        },
        occurred_at: at,
    }
}

fn in_country(mut event: NewEvent, country: &str, ip: &str) -> NewEvent {
    event.geo.country = country.to_string();
    event.visitor.ip_address = ip.to_string();
    event
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_append_returns_stored_event(pool: PgPool) {
    let repo = PgEventRepository::new(Arc::new(pool.clone()));

    let mut event = new_event(7, Some(3), EventKind::Click, ts(1, 10));
    event.payload = EventPayload::Click {
        link_title: Some("Shop".to_string()),
        link_url: None,
    };

    let stored = repo.append(event.clone()).await.unwrap();

    assert!(stored.id > 0);
    assert_eq!(stored.owner_id, 7);
    assert_eq!(stored.payload, event.payload);

    let (kind, payload): (String, serde_json::Value) =
        sqlx::query_as("SELECT kind, payload FROM analytics_events WHERE id = $1")
            .bind(stored.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(kind, "click");
    assert_eq!(payload["event_type"], "click");
    assert_eq!(payload["link_title"], "Shop");
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_daily_counts_group_by_utc_day(pool: PgPool) {
    let repo = PgEventRepository::new(Arc::new(pool));

    repo.append(new_event(7, None, EventKind::View, ts(1, 9))).await.unwrap();
    repo.append(new_event(7, None, EventKind::View, ts(1, 23))).await.unwrap();
    repo.append(new_event(7, Some(1), EventKind::Click, ts(2, 0))).await.unwrap();
    repo.append(new_event(8, None, EventKind::View, ts(2, 5))).await.unwrap();

    let rows = repo.daily_counts(7, ts(1, 0)).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, ts(1, 0).date_naive());
    assert_eq!(rows[0].kind, EventKind::View);
    assert_eq!(rows[0].count, 2);
    assert_eq!(rows[1].date, ts(2, 0).date_naive());
    assert_eq!(rows[1].kind, EventKind::Click);
    assert_eq!(rows[1].count, 1);
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_link_clicks_ordering(pool: PgPool) {
    let repo = PgEventRepository::new(Arc::new(pool));

    repo.append(new_event(7, Some(10), EventKind::Click, ts(1, 8))).await.unwrap();
    repo.append(new_event(7, Some(20), EventKind::Click, ts(1, 9))).await.unwrap();
    repo.append(new_event(7, Some(20), EventKind::Click, ts(2, 9))).await.unwrap();
    repo.append(new_event(7, Some(30), EventKind::Click, ts(1, 7))).await.unwrap();
    repo.append(new_event(7, Some(10), EventKind::View, ts(1, 7))).await.unwrap();

    let rows = repo.link_clicks(7).await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.link_id).collect();

    assert_eq!(ids, vec![20, 30, 10]);
    assert_eq!(rows[0].clicks, 2);
    assert_eq!(rows[0].last_click, ts(2, 9));
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_geo_stats(pool: PgPool) {
    let repo = PgEventRepository::new(Arc::new(pool));

    for (country, ip) in [("DE", "1.1.1.1"), ("DE", "1.1.1.1"), ("DE", "2.2.2.2"), ("FR", "3.3.3.3")] {
        let event = in_country(new_event(7, None, EventKind::View, ts(2, 10)), country, ip);
        repo.append(event).await.unwrap();
    }
    repo.append(new_event(7, None, EventKind::View, ts(2, 10))).await.unwrap();

    let rows = repo.geo_stats(7, ts(1, 0), 20).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].country, "DE");
    assert_eq!(rows[0].visits, 3);
    assert_eq!(rows[0].unique_visitors, 2);
    assert_eq!(rows[1].country, "FR");

    let limited = repo.geo_stats(7, ts(1, 0), 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_device_stats(pool: PgPool) {
    let repo = PgEventRepository::new(Arc::new(pool));

    let mut mobile = new_event(7, None, EventKind::View, ts(2, 10));
    mobile.device = DeviceInfo {
        device_class: DeviceClass::Mobile,
        browser: "Safari".to_string(),
        os: "iOS".to_string(),
    };
    repo.append(mobile).await.unwrap();
    repo.append(new_event(7, None, EventKind::View, ts(2, 11))).await.unwrap();
    repo.append(new_event(7, None, EventKind::View, ts(2, 12))).await.unwrap();

    let stats = repo.device_stats(7, ts(1, 0)).await.unwrap();

    assert_eq!(stats.device_types.get("desktop"), Some(&2));
    assert_eq!(stats.device_types.get("mobile"), Some(&1));
    assert_eq!(stats.browsers.get("Safari"), Some(&1));
    assert_eq!(stats.operating_systems.get("Linux"), Some(&2));

    let empty = repo.device_stats(99, ts(1, 0)).await.unwrap();
    assert!(empty.is_empty());
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_count_events_is_half_open(pool: PgPool) {
    let repo = PgEventRepository::new(Arc::new(pool));

    repo.append(new_event(7, None, EventKind::View, ts(1, 0))).await.unwrap();
    repo.append(new_event(7, None, EventKind::View, ts(2, 0))).await.unwrap();
    repo.append(new_event(7, Some(1), EventKind::Click, ts(1, 12))).await.unwrap();

    let count = repo
        .count_events(7, EventKind::View, ts(1, 0), ts(2, 0))
        .await
        .unwrap();

    assert_eq!(count, 1);
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_purge_before(pool: PgPool) {
    let repo = PgEventRepository::new(Arc::new(pool));
    let now = Utc::now();

    repo.append(new_event(7, None, EventKind::View, now - Duration::days(400)))
        .await
        .unwrap();
    repo.append(new_event(7, None, EventKind::View, now - Duration::days(2)))
        .await
        .unwrap();

    let purged = repo.purge_before(now - Duration::days(365)).await.unwrap();

    assert_eq!(purged, 1);
    assert!(repo.ping().await.is_ok());
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_links_ordered_by_position(pool: PgPool) {
    for (owner, title, position, active) in [
        (7_i64, "Second", 2, true),
        (7, "First", 1, false),
        (8, "Other", 0, true),
    ] {
        sqlx::query(
            "INSERT INTO links (owner_id, title, url, position, is_active) VALUES ($1, $2, 'https://example.com', $3, $4)",
        )
        .bind(owner)
        .bind(title)
        .bind(position)
        .bind(active)
        .execute(&pool)
        .await
        .unwrap();
    }
    let repo = PgLinkRepository::new(Arc::new(pool));

    let links = repo.list_for_owner(7).await.unwrap();

    let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert!(!links[0].is_active);
    assert_eq!(links[1].link_type, "website");
}
