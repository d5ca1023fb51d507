//! In-process event repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::domain::aggregation::{self, DailyKindCount, DeviceStats, GeoStats, LinkClicks};
use crate::domain::entities::{Event, EventKind, NewEvent};
use crate::domain::repositories::EventRepository;
use crate::error::AppError;

/// Event log kept in a vector behind an async lock.
///
/// Aggregations run through [`crate::domain::aggregation`], so results match
/// the PostgreSQL repository. [`Self::set_unavailable`] makes every call fail
/// like a lost database connection.
#[derive(Debug, Default)]
pub struct MemoryEventRepository {
    events: RwLock<Vec<Event>>,
    next_id: AtomicI64,
    unavailable: AtomicBool,
}

impl MemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// All stored events in insertion order.
    pub async fn snapshot(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    fn check(&self, operation: &'static str) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::internal(
                "Database error",
                json!({ "operation": operation }),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn append(&self, new_event: NewEvent) -> Result<Event, AppError> {
        self.check("append_event")?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let event = new_event.into_event(id);
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn daily_counts(
        &self,
        owner_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyKindCount>, AppError> {
        self.check("daily_counts")?;
        Ok(aggregation::daily_counts(&self.events.read().await, owner_id, since))
    }

    async fn link_clicks(&self, owner_id: i64) -> Result<Vec<LinkClicks>, AppError> {
        self.check("link_clicks")?;
        Ok(aggregation::link_clicks(&self.events.read().await, owner_id))
    }

    async fn geo_stats(
        &self,
        owner_id: i64,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<GeoStats>, AppError> {
        self.check("geo_stats")?;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(aggregation::geo_stats(
            &self.events.read().await,
            owner_id,
            since,
            limit,
        ))
    }

    async fn device_stats(
        &self,
        owner_id: i64,
        since: DateTime<Utc>,
    ) -> Result<DeviceStats, AppError> {
        self.check("device_stats")?;
        Ok(aggregation::device_stats(&self.events.read().await, owner_id, since))
    }

    async fn count_events(
        &self,
        owner_id: i64,
        kind: EventKind,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        self.check("count_events")?;
        Ok(aggregation::count_events(
            &self.events.read().await,
            owner_id,
            kind,
            from,
            to,
        ))
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        self.check("purge_events")?;

        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|e| e.occurred_at >= cutoff);
        Ok((before - events.len()) as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check("ping")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DeviceInfo, EventPayload, GeoInfo, VisitorInfo};
    use chrono::Duration;

    fn new_event(owner_id: i64, kind: EventKind, occurred_at: DateTime<Utc>) -> NewEvent {
        NewEvent {
            owner_id,
            link_id: None,
            payload: EventPayload::empty(kind),
            visitor: VisitorInfo::default(),
            geo: GeoInfo::default(),
            device: DeviceInfo::default(),
            occurred_at,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let repo = MemoryEventRepository::new();
        let now = Utc::now();

        let first = repo.append(new_event(1, EventKind::View, now)).await.unwrap();
        let second = repo.append(new_event(1, EventKind::Click, now)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_purge_before_keeps_recent_events() {
        let repo = MemoryEventRepository::new();
        let now = Utc::now();
        repo.append(new_event(1, EventKind::View, now - Duration::days(400)))
            .await
            .unwrap();
        repo.append(new_event(1, EventKind::View, now)).await.unwrap();

        let purged = repo.purge_before(now - Duration::days(365)).await.unwrap();

        assert_eq!(purged, 1);
        assert_eq!(repo.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let repo = MemoryEventRepository::new();
        repo.set_unavailable(true);

        assert!(repo.ping().await.is_err());
        let err = repo
            .append(new_event(1, EventKind::View, Utc::now()))
            .await
            .unwrap_err();
        match err {
            AppError::Internal { details, .. } => assert_eq!(details["operation"], "append_event"),
            other => panic!("unexpected error: {other:?}"),
        }

        repo.set_unavailable(false);
        assert!(repo.ping().await.is_ok());
    }
}
