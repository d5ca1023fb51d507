//! Repository trait for the analytics event log.

use crate::domain::aggregation::{DailyKindCount, DeviceStats, GeoStats, LinkClicks};
use crate::domain::entities::{Event, EventKind, NewEvent};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the append-only event log.
///
/// Writes are single appends; every other method is a read-only aggregation
/// scoped to one owner. An owner with no events gets empty results, never an
/// error.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgEventRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryEventRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Appends a new event and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn append(&self, new_event: NewEvent) -> Result<Event, AppError>;

    /// Counts events per `(UTC date, kind)` with `occurred_at >= since`.
    async fn daily_counts(
        &self,
        owner_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyKindCount>, AppError>;

    /// Click counts per link over all time.
    ///
    /// Only click events with a link id are counted. Ordered by clicks
    /// descending, then by first click ascending.
    async fn link_clicks(&self, owner_id: i64) -> Result<Vec<LinkClicks>, AppError>;

    /// Visits and distinct visitor addresses per non-empty country.
    async fn geo_stats(
        &self,
        owner_id: i64,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<GeoStats>, AppError>;

    /// Device class, browser and OS frequency tables.
    async fn device_stats(
        &self,
        owner_id: i64,
        since: DateTime<Utc>,
    ) -> Result<DeviceStats, AppError>;

    /// Counts events of `kind` with `from <= occurred_at < to`.
    async fn count_events(
        &self,
        owner_id: i64,
        kind: EventKind,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    /// Deletes events older than `cutoff` and returns how many were removed.
    ///
    /// Maintenance only; not used while serving requests.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
