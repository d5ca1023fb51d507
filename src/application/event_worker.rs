//! Fire-and-forget event tracking.
//!
//! HTTP handlers hand [`TrackRequest`]s to an [`EventTracker`], which puts them
//! on a bounded channel without waiting. [`run_event_worker`] drains the channel
//! in the background and records each event once. Analytics failures never
//! reach the request that produced the event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::application::services::AnalyticsService;
use crate::domain::repositories::{EventRepository, LinkRepository};
use crate::domain::track_request::TrackRequest;

/// Interval between two retention purges.
pub const RETENTION_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Sending half of the event queue.
#[derive(Debug, Clone)]
pub struct EventTracker {
    sender: mpsc::Sender<TrackRequest>,
}

impl EventTracker {
    /// Creates a tracker and the receiver to pass to [`run_event_worker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TrackRequest>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queues an event without blocking.
    ///
    /// Returns `false` when the event was dropped because the queue is full or
    /// the worker has stopped.
    pub fn track(&self, request: TrackRequest) -> bool {
        match self.sender.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(request)) => {
                metrics::counter!("analytics_events_dropped_total", "reason" => "full")
                    .increment(1);
                tracing::warn!(
                    owner_id = request.owner_id,
                    kind = %request.kind(),
                    "Event queue full, dropping event"
                );
                false
            }
            Err(TrySendError::Closed(request)) => {
                metrics::counter!("analytics_events_dropped_total", "reason" => "closed")
                    .increment(1);
                tracing::warn!(
                    owner_id = request.owner_id,
                    kind = %request.kind(),
                    "Event queue closed, dropping event"
                );
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots in the queue.
    pub fn available(&self) -> usize {
        self.sender.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

/// Records queued events until every [`EventTracker`] has been dropped.
///
/// A failed write is logged and counted, then the worker moves on.
pub async fn run_event_worker<E, L>(
    mut receiver: mpsc::Receiver<TrackRequest>,
    service: Arc<AnalyticsService<E, L>>,
) where
    E: EventRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    tracing::info!("Event worker started");

    while let Some(request) = receiver.recv().await {
        let owner_id = request.owner_id;
        let kind = request.kind();

        if let Err(e) = service.record_event(request).await {
            tracing::error!(owner_id, kind = %kind, error = %e, "Failed to record event");
        }
    }

    tracing::info!("Event worker stopped");
}

/// Purges events older than `retention_days` now and then every `period`.
pub fn spawn_retention_task<E, L>(
    service: Arc<AnalyticsService<E, L>>,
    retention_days: i64,
    period: Duration,
) -> JoinHandle<()>
where
    E: EventRepository + ?Sized + 'static,
    L: LinkRepository + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = service.purge_expired(retention_days).await {
                tracing::error!(error = %e, retention_days, "Retention purge failed");
            }
        }
    })
}
