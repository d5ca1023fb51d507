//! PostgreSQL implementation of the event repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use crate::domain::aggregation::{DailyKindCount, DeviceStats, GeoStats, LinkClicks};
use crate::domain::entities::{Event, EventKind, NewEvent};
use crate::domain::repositories::EventRepository;
use crate::error::AppError;

/// PostgreSQL repository for the analytics event log.
///
/// Grouping happens in SQL. Daily buckets are UTC calendar dates.
pub struct PgEventRepository {
    pool: Arc<PgPool>,
}

impl PgEventRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DailyRow {
    day: NaiveDate,
    kind: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct LinkClicksRow {
    link_id: i64,
    clicks: i64,
    first_click: DateTime<Utc>,
    last_click: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct GeoRow {
    country: String,
    visits: i64,
    unique_visitors: i64,
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    dimension: String,
    value: String,
    count: i64,
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn append(&self, new_event: NewEvent) -> Result<Event, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO analytics_events (
                owner_id, link_id, kind,
                ip_address, user_agent, referrer,
                country, region, city,
                device_class, browser, os,
                payload, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(new_event.owner_id)
        .bind(new_event.link_id)
        .bind(new_event.kind().as_str())
        .bind(&new_event.visitor.ip_address)
        .bind(&new_event.visitor.user_agent)
        .bind(&new_event.visitor.referrer)
        .bind(&new_event.geo.country)
        .bind(&new_event.geo.region)
        .bind(&new_event.geo.city)
        .bind(new_event.device.device_class.as_str())
        .bind(&new_event.device.browser)
        .bind(&new_event.device.os)
        .bind(Json(&new_event.payload))
        .bind(new_event.occurred_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| AppError::storage("append_event", e))?;

        Ok(new_event.into_event(id))
    }

    async fn daily_counts(
        &self,
        owner_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyKindCount>, AppError> {
        let rows: Vec<DailyRow> = sqlx::query_as(
            r#"
            SELECT (occurred_at AT TIME ZONE 'UTC')::date AS day,
                   kind,
                   COUNT(*) AS count
            FROM analytics_events
            WHERE owner_id = $1
              AND occurred_at >= $2
            GROUP BY day, kind
            ORDER BY day ASC
            "#,
        )
        .bind(owner_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| AppError::storage("daily_counts", e))?;

        rows.into_iter()
            .map(|row| {
                Ok(DailyKindCount {
                    date: row.day,
                    kind: row.kind.parse::<EventKind>()?,
                    count: row.count,
                })
            })
            .collect()
    }

    async fn link_clicks(&self, owner_id: i64) -> Result<Vec<LinkClicks>, AppError> {
        let rows: Vec<LinkClicksRow> = sqlx::query_as(
            r#"
            SELECT link_id,
                   COUNT(*) AS clicks,
                   MIN(occurred_at) AS first_click,
                   MAX(occurred_at) AS last_click
            FROM analytics_events
            WHERE owner_id = $1
              AND kind = 'click'
              AND link_id IS NOT NULL
            GROUP BY link_id
            ORDER BY clicks DESC, first_click ASC, MIN(id) ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| AppError::storage("link_clicks", e))?;

        Ok(rows
            .into_iter()
            .map(|row| LinkClicks {
                link_id: row.link_id,
                clicks: row.clicks,
                first_click: row.first_click,
                last_click: row.last_click,
            })
            .collect())
    }

    async fn geo_stats(
        &self,
        owner_id: i64,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<GeoStats>, AppError> {
        let rows: Vec<GeoRow> = sqlx::query_as(
            r#"
            SELECT country,
                   COUNT(*) AS visits,
                   COUNT(DISTINCT ip_address) AS unique_visitors
            FROM analytics_events
            WHERE owner_id = $1
              AND occurred_at >= $2
              AND country <> ''
            GROUP BY country
            ORDER BY visits DESC, country ASC
            LIMIT $3
            "#,
        )
        .bind(owner_id)
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| AppError::storage("geo_stats", e))?;

        Ok(rows
            .into_iter()
            .map(|row| GeoStats {
                country: row.country,
                visits: row.visits,
                unique_visitors: row.unique_visitors,
            })
            .collect())
    }

    async fn device_stats(
        &self,
        owner_id: i64,
        since: DateTime<Utc>,
    ) -> Result<DeviceStats, AppError> {
        let rows: Vec<DeviceRow> = sqlx::query_as(
            r#"
            WITH scoped AS (
                SELECT device_class, browser, os
                FROM analytics_events
                WHERE owner_id = $1
                  AND occurred_at >= $2
            )
            SELECT 'device'::text AS dimension, device_class::text AS value, COUNT(*) AS count
            FROM scoped GROUP BY device_class
            UNION ALL
            SELECT 'browser'::text, browser, COUNT(*) FROM scoped GROUP BY browser
            UNION ALL
            SELECT 'os'::text, os, COUNT(*) FROM scoped GROUP BY os
            "#,
        )
        .bind(owner_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| AppError::storage("device_stats", e))?;

        let mut stats = DeviceStats::default();
        for row in rows {
            let table = match row.dimension.as_str() {
                "device" => &mut stats.device_types,
                "browser" => &mut stats.browsers,
                _ => &mut stats.operating_systems,
            };
            table.insert(row.value, row.count);
        }
        Ok(stats)
    }

    async fn count_events(
        &self,
        owner_id: i64,
        kind: EventKind,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM analytics_events
            WHERE owner_id = $1
              AND kind = $2
              AND occurred_at >= $3
              AND occurred_at < $4
            "#,
        )
        .bind(owner_id)
        .bind(kind.as_str())
        .bind(from)
        .bind(to)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| AppError::storage("count_events", e))
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM analytics_events WHERE occurred_at < $1")
            .bind(cutoff)
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| AppError::storage("purge_events", e))?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| AppError::storage("ping", e))?;
        Ok(())
    }
}
