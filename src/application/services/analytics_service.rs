//! Event recording and analytics reports.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::aggregation::{
    DailyStats, DeviceStats, GeoStats, LinkClicks, TopLink, group_daily,
};
use crate::domain::entities::{Event, EventKind, NewEvent, OwnedLink, VisitorInfo};
use crate::domain::metrics::{ConversionRate, LinkTotals, growth_rate, top_link_title};
use crate::domain::repositories::{EventRepository, LinkRepository};
use crate::domain::track_request::TrackRequest;
use crate::domain::user_agent;
use crate::error::AppError;

/// Lookback window used when the caller does not pass one.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
pub const MAX_WINDOW_DAYS: i64 = 365;
pub const DEFAULT_TOP_LINKS: usize = 10;
pub const GEO_STATS_LIMIT: i64 = 20;
/// Events older than this are purged by the retention task.
pub const DEFAULT_RETENTION_DAYS: i64 = 365;

/// Combined report returned to the analytics dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub daily_stats: Vec<DailyStats>,
    pub top_links: Vec<TopLink>,
    pub geo_stats: Vec<GeoStats>,
    pub device_stats: DeviceStats,
    pub total_clicks: i64,
    pub profile_views: i64,
    pub conversion_rate: ConversionRate,
    pub monthly_growth: i64,
    pub top_link: String,
    pub total_links: i64,
    pub active_links: i64,
}

/// Service for recording analytics events and answering report queries.
///
/// Holds the event log and read access to the owner's links. Every query
/// is scoped to one owner; an owner without activity gets zero-valued
/// results.
pub struct AnalyticsService<E: EventRepository + ?Sized, L: LinkRepository + ?Sized> {
    events: Arc<E>,
    links: Arc<L>,
}

impl<E: EventRepository + ?Sized, L: LinkRepository + ?Sized> AnalyticsService<E, L> {
    /// Creates a new analytics service.
    pub fn new(events: Arc<E>, links: Arc<L>) -> Self {
        Self { events, links }
    }

    /// Records one interaction.
    ///
    /// Classifies the user agent, fills missing metadata with empty strings
    /// and stamps the current time unless `occurred_at` is given.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `owner_id` or `link_id` is not positive.
    /// Returns [`AppError::Internal`] if the append fails; nothing is retried.
    pub async fn record_event(&self, request: TrackRequest) -> Result<Event, AppError> {
        validate_ids(request.owner_id, request.link_id)?;

        let kind = request.kind();
        let metadata = request.metadata;
        let new_event = NewEvent {
            owner_id: request.owner_id,
            link_id: request.link_id,
            device: user_agent::classify(&metadata.user_agent),
            visitor: VisitorInfo {
                ip_address: metadata.ip_address,
                user_agent: metadata.user_agent,
                referrer: metadata.referrer,
            },
            geo: metadata.geo,
            payload: request.payload,
            occurred_at: request.occurred_at.unwrap_or_else(Utc::now),
        };

        match self.events.append(new_event).await {
            Ok(event) => {
                metrics::counter!("analytics_events_recorded_total", "kind" => kind.as_str())
                    .increment(1);
                tracing::debug!(
                    event_id = event.id,
                    owner_id = event.owner_id,
                    kind = %kind,
                    "Event recorded"
                );
                Ok(event)
            }
            Err(e) => {
                metrics::counter!("analytics_events_failed_total").increment(1);
                Err(e)
            }
        }
    }

    /// Per-day event totals for the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `days` is outside `1..=365`.
    pub async fn daily_stats(&self, owner_id: i64, days: i64) -> Result<Vec<DailyStats>, AppError> {
        let since = window_start(Utc::now(), days)?;
        let rows = self.events.daily_counts(owner_id, since).await?;
        Ok(group_daily(rows))
    }

    /// Most clicked links, at most `limit` of them.
    ///
    /// Click totals come from the event log. Links that no longer belong to
    /// the owner are dropped before truncation.
    pub async fn top_links(&self, owner_id: i64, limit: usize) -> Result<Vec<TopLink>, AppError> {
        let (clicks, links) = tokio::try_join!(
            self.events.link_clicks(owner_id),
            self.links.list_for_owner(owner_id),
        )?;
        Ok(join_top_links(clicks, &links, limit))
    }

    /// Visits per country over the last `days` days, capped at 20 countries.
    pub async fn geo_stats(&self, owner_id: i64, days: i64) -> Result<Vec<GeoStats>, AppError> {
        let since = window_start(Utc::now(), days)?;
        self.events.geo_stats(owner_id, since, GEO_STATS_LIMIT).await
    }

    /// Device, browser and OS distribution over the last `days` days.
    pub async fn device_stats(&self, owner_id: i64, days: i64) -> Result<DeviceStats, AppError> {
        let since = window_start(Utc::now(), days)?;
        self.events.device_stats(owner_id, since).await
    }

    /// Builds the full dashboard report for the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `days` is outside `1..=365`.
    /// Returns the first storage error if any query fails.
    pub async fn get_stats(&self, owner_id: i64, days: i64) -> Result<StatsSummary, AppError> {
        self.get_stats_at(owner_id, days, Utc::now()).await
    }

    /// [`Self::get_stats`] evaluated at a fixed point in time.
    pub async fn get_stats_at(
        &self,
        owner_id: i64,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<StatsSummary, AppError> {
        let since = window_start(now, days)?;
        let previous_since = since - Duration::days(days);

        let (daily_rows, clicks, geo_stats, device_stats, links, profile_views, previous_views) =
            tokio::try_join!(
                self.events.daily_counts(owner_id, since),
                self.events.link_clicks(owner_id),
                self.events.geo_stats(owner_id, since, GEO_STATS_LIMIT),
                self.events.device_stats(owner_id, since),
                self.links.list_for_owner(owner_id),
                self.events
                    .count_events(owner_id, EventKind::View, since, now),
                self.events
                    .count_events(owner_id, EventKind::View, previous_since, since),
            )?;

        let totals = LinkTotals::from_links(&links);

        Ok(StatsSummary {
            daily_stats: group_daily(daily_rows),
            top_links: join_top_links(clicks, &links, DEFAULT_TOP_LINKS),
            geo_stats,
            device_stats,
            total_clicks: totals.total_clicks,
            profile_views,
            conversion_rate: ConversionRate::compute(totals.total_clicks, profile_views),
            monthly_growth: growth_rate(profile_views, previous_views),
            top_link: top_link_title(&links),
            total_links: totals.total_links,
            active_links: totals.active_links,
        })
    }

    /// Deletes events older than `retention_days`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `retention_days` is not positive.
    pub async fn purge_expired(&self, retention_days: i64) -> Result<u64, AppError> {
        if retention_days <= 0 {
            return Err(AppError::bad_request(
                "Retention must be at least one day",
                json!({ "retention_days": retention_days }),
            ));
        }

        let cutoff = Utc::now() - Duration::days(retention_days);
        let purged = self.events.purge_before(cutoff).await?;

        tracing::info!(purged, %cutoff, "Expired events purged");
        Ok(purged)
    }

    /// Checks that the event store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.events.ping().await
    }
}

fn validate_ids(owner_id: i64, link_id: Option<i64>) -> Result<(), AppError> {
    if owner_id <= 0 {
        return Err(AppError::bad_request(
            "owner_id must be a positive integer",
            json!({ "owner_id": owner_id }),
        ));
    }
    if let Some(link_id) = link_id
        && link_id <= 0
    {
        return Err(AppError::bad_request(
            "link_id must be a positive integer",
            json!({ "link_id": link_id }),
        ));
    }
    Ok(())
}

fn window_start(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, AppError> {
    if !(1..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(AppError::bad_request(
            format!("days must be between 1 and {MAX_WINDOW_DAYS}"),
            json!({ "days": days }),
        ));
    }
    Ok(now - Duration::days(days))
}

/// Attaches link details to click totals, keeping the input order.
fn join_top_links(clicks: Vec<LinkClicks>, links: &[OwnedLink], limit: usize) -> Vec<TopLink> {
    let by_id: HashMap<i64, &OwnedLink> = links.iter().map(|l| (l.id, l)).collect();

    clicks
        .into_iter()
        .filter_map(|row| {
            by_id.get(&row.link_id).map(|link| TopLink {
                link_id: row.link_id,
                title: link.title.clone(),
                url: link.url.clone(),
                link_type: link.link_type.clone(),
                clicks: row.clicks,
                last_click: row.last_click,
            })
        })
        .take(limit)
        .collect()
}
