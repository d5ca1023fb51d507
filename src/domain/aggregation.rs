//! Report types produced by the aggregation queries, plus the in-process
//! implementations of those queries.
//!
//! The PostgreSQL repository pushes grouping into SQL and only uses
//! [`group_daily`] for the second regrouping step. The in-memory repository runs
//! every query through the functions here, so both backends share one set of
//! bucketing and ordering rules.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::entities::{Event, EventKind};

/// Number of events of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindCount {
    pub kind: EventKind,
    pub count: i64,
}

/// One `(UTC date, kind)` bucket as returned by the first grouping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyKindCount {
    pub date: NaiveDate,
    pub kind: EventKind,
    pub count: i64,
}

/// Event totals for a single UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_events: i64,
    pub events: Vec<KindCount>,
}

/// Click totals for one link, taken from the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkClicks {
    pub link_id: i64,
    pub clicks: i64,
    pub first_click: DateTime<Utc>,
    pub last_click: DateTime<Utc>,
}

/// A link in the top-links report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLink {
    pub link_id: i64,
    pub title: String,
    pub url: String,
    pub link_type: String,
    pub clicks: i64,
    pub last_click: DateTime<Utc>,
}

/// Visits per country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoStats {
    pub country: String,
    pub visits: i64,
    pub unique_visitors: i64,
}

/// Frequency tables over device class, browser and OS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub device_types: BTreeMap<String, i64>,
    pub browsers: BTreeMap<String, i64>,
    pub operating_systems: BTreeMap<String, i64>,
}

impl DeviceStats {
    pub fn is_empty(&self) -> bool {
        self.device_types.is_empty() && self.browsers.is_empty() && self.operating_systems.is_empty()
    }
}

/// Regroups `(date, kind)` buckets into one entry per date.
///
/// Output is ascending by date; kinds within a day follow [`EventKind`] order.
/// Days without events are not synthesised.
pub fn group_daily(mut rows: Vec<DailyKindCount>) -> Vec<DailyStats> {
    rows.sort_by_key(|r| (r.date, r.kind));

    let mut days: Vec<DailyStats> = Vec::new();
    for row in rows {
        match days.last_mut() {
            Some(day) if day.date == row.date => {
                day.total_events += row.count;
                match day.events.iter_mut().find(|e| e.kind == row.kind) {
                    Some(existing) => existing.count += row.count,
                    None => day.events.push(KindCount {
                        kind: row.kind,
                        count: row.count,
                    }),
                }
            }
            _ => days.push(DailyStats {
                date: row.date,
                total_events: row.count,
                events: vec![KindCount {
                    kind: row.kind,
                    count: row.count,
                }],
            }),
        }
    }
    days
}

fn owned_since<'a>(
    events: &'a [Event],
    owner_id: i64,
    since: DateTime<Utc>,
) -> impl Iterator<Item = &'a Event> {
    events
        .iter()
        .filter(move |e| e.owner_id == owner_id && e.occurred_at >= since)
}

/// First grouping pass of the daily report.
pub fn daily_counts(events: &[Event], owner_id: i64, since: DateTime<Utc>) -> Vec<DailyKindCount> {
    let mut buckets: HashMap<(NaiveDate, EventKind), i64> = HashMap::new();
    for event in owned_since(events, owner_id, since) {
        *buckets
            .entry((event.occurred_at.date_naive(), event.kind()))
            .or_default() += 1;
    }

    let mut rows: Vec<DailyKindCount> = buckets
        .into_iter()
        .map(|((date, kind), count)| DailyKindCount { date, kind, count })
        .collect();
    rows.sort_by_key(|r| (r.date, r.kind));
    rows
}

/// Per-link click totals over all time, most clicked first.
///
/// Ties keep the order in which the links were first clicked.
pub fn link_clicks(events: &[Event], owner_id: i64) -> Vec<LinkClicks> {
    let mut by_link: HashMap<i64, (LinkClicks, i64)> = HashMap::new();

    for event in events
        .iter()
        .filter(|e| e.owner_id == owner_id && e.kind() == EventKind::Click)
    {
        let Some(link_id) = event.link_id else {
            continue;
        };

        by_link
            .entry(link_id)
            .and_modify(|(stats, first_id)| {
                stats.clicks += 1;
                if event.occurred_at > stats.last_click {
                    stats.last_click = event.occurred_at;
                }
                if (event.occurred_at, event.id) < (stats.first_click, *first_id) {
                    stats.first_click = event.occurred_at;
                    *first_id = event.id;
                }
            })
            .or_insert((
                LinkClicks {
                    link_id,
                    clicks: 1,
                    first_click: event.occurred_at,
                    last_click: event.occurred_at,
                },
                event.id,
            ));
    }

    let mut rows: Vec<(LinkClicks, i64)> = by_link.into_values().collect();
    rows.sort_by(|(a, a_first), (b, b_first)| {
        b.clicks
            .cmp(&a.clicks)
            .then_with(|| (a.first_click, *a_first).cmp(&(b.first_click, *b_first)))
    });
    rows.into_iter().map(|(stats, _)| stats).collect()
}

/// Visits per country, most visited first, capped at `limit`.
///
/// Events with an empty country are skipped. Unique visitors are distinct
/// `ip_address` strings; no address normalisation is applied.
pub fn geo_stats(
    events: &[Event],
    owner_id: i64,
    since: DateTime<Utc>,
    limit: usize,
) -> Vec<GeoStats> {
    let mut by_country: HashMap<&str, (i64, HashSet<&str>)> = HashMap::new();

    for event in owned_since(events, owner_id, since).filter(|e| !e.geo.country.is_empty()) {
        let (visits, ips) = by_country.entry(event.geo.country.as_str()).or_default();
        *visits += 1;
        ips.insert(event.visitor.ip_address.as_str());
    }

    let mut rows: Vec<GeoStats> = by_country
        .into_iter()
        .map(|(country, (visits, ips))| GeoStats {
            country: country.to_string(),
            visits,
            unique_visitors: ips.len() as i64,
        })
        .collect();
    rows.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.country.cmp(&b.country)));
    rows.truncate(limit);
    rows
}

/// Device class, browser and OS frequencies across all event kinds.
pub fn device_stats(events: &[Event], owner_id: i64, since: DateTime<Utc>) -> DeviceStats {
    let mut stats = DeviceStats::default();
    for event in owned_since(events, owner_id, since) {
        *stats
            .device_types
            .entry(event.device.device_class.as_str().to_string())
            .or_default() += 1;
        *stats
            .browsers
            .entry(event.device.browser.clone())
            .or_default() += 1;
        *stats
            .operating_systems
            .entry(event.device.os.clone())
            .or_default() += 1;
    }
    stats
}

/// Counts events of one kind with `from <= occurred_at < to`.
pub fn count_events(
    events: &[Event],
    owner_id: i64,
    kind: EventKind,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> i64 {
    events
        .iter()
        .filter(|e| {
            e.owner_id == owner_id && e.kind() == kind && e.occurred_at >= from && e.occurred_at < to
        })
        .count() as i64
}
