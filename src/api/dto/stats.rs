//! DTOs for the analytics report endpoint.
//!
//! Keys are camelCase to match the dashboard client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use std::collections::BTreeMap;

use crate::application::services::StatsSummary;
use crate::application::services::analytics_service::DEFAULT_WINDOW_DAYS;
use crate::domain::aggregation::{DailyStats, DeviceStats, GeoStats, KindCount, TopLink};
use crate::domain::entities::EventKind;
use crate::domain::metrics::ConversionRate;

/// Query parameters for `GET /api/analytics/stats`.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct StatsQueryParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub days: Option<i64>,
}

impl StatsQueryParams {
    pub fn days(&self) -> i64 {
        self.days.unwrap_or(DEFAULT_WINDOW_DAYS)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub daily_stats: Vec<DailyStatsDto>,
    pub top_links: Vec<TopLinkDto>,
    pub geo_stats: Vec<GeoStatsDto>,
    pub device_stats: DeviceStatsDto,
    pub total_clicks: i64,
    pub profile_views: i64,
    pub conversion_rate: ConversionRate,
    pub monthly_growth: i64,
    pub top_link: String,
    pub total_links: i64,
    pub active_links: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatsDto {
    pub date: NaiveDate,
    pub total_events: i64,
    pub events: Vec<KindCountDto>,
}

#[derive(Debug, Serialize)]
pub struct KindCountDto {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLinkDto {
    pub link_id: i64,
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub link_type: String,
    pub clicks: i64,
    pub last_click: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoStatsDto {
    pub country: String,
    pub visits: i64,
    pub unique_visitors: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatsDto {
    pub device_types: BTreeMap<String, i64>,
    pub browsers: BTreeMap<String, i64>,
    pub operating_systems: BTreeMap<String, i64>,
}

impl From<KindCount> for KindCountDto {
    fn from(c: KindCount) -> Self {
        Self {
            kind: c.kind,
            count: c.count,
        }
    }
}

impl From<DailyStats> for DailyStatsDto {
    fn from(d: DailyStats) -> Self {
        Self {
            date: d.date,
            total_events: d.total_events,
            events: d.events.into_iter().map(KindCountDto::from).collect(),
        }
    }
}

impl From<TopLink> for TopLinkDto {
    fn from(l: TopLink) -> Self {
        Self {
            link_id: l.link_id,
            title: l.title,
            url: l.url,
            link_type: l.link_type,
            clicks: l.clicks,
            last_click: l.last_click,
        }
    }
}

impl From<GeoStats> for GeoStatsDto {
    fn from(g: GeoStats) -> Self {
        Self {
            country: g.country,
            visits: g.visits,
            unique_visitors: g.unique_visitors,
        }
    }
}

impl From<DeviceStats> for DeviceStatsDto {
    fn from(d: DeviceStats) -> Self {
        Self {
            device_types: d.device_types,
            browsers: d.browsers,
            operating_systems: d.operating_systems,
        }
    }
}

impl From<StatsSummary> for StatsResponse {
    fn from(s: StatsSummary) -> Self {
        Self {
            daily_stats: s.daily_stats.into_iter().map(Into::into).collect(),
            top_links: s.top_links.into_iter().map(Into::into).collect(),
            geo_stats: s.geo_stats.into_iter().map(Into::into).collect(),
            device_stats: s.device_stats.into(),
            total_clicks: s.total_clicks,
            profile_views: s.profile_views,
            conversion_rate: s.conversion_rate,
            monthly_growth: s.monthly_growth,
            top_link: s.top_link,
            total_links: s.total_links,
            active_links: s.active_links,
        }
    }
}
