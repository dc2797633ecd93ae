//! Product analytics events
//!
//! Capturing is fire-and-forget: events go into a bounded queue drained by a
//! background task, and a full queue drops the event instead of blocking the
//! request.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub distinct_id: Uuid,
    pub event: String,
    pub properties: serde_json::Value,
}

impl AnalyticsEvent {
    pub fn new(distinct_id: Uuid, event: impl Into<String>, properties: serde_json::Value) -> Self {
        Self {
            distinct_id,
            event: event.into(),
            properties,
        }
    }
}

/// Destination for analytics events
pub trait AnalyticsSink: Send + Sync {
    /// Queue an event without waiting for delivery
    fn capture(&self, event: AnalyticsEvent);
}

/// Queues events for a background task that records them in the
/// `omnivore::analytics` log target.
#[derive(Clone)]
pub struct AnalyticsService {
    sender: mpsc::Sender<AnalyticsEvent>,
}

impl AnalyticsService {
    /// Must be called from within a Tokio runtime.
    pub fn new(capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<AnalyticsEvent>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                tracing::info!(
                    target: "omnivore::analytics",
                    distinct_id = %event.distinct_id,
                    event = %event.event,
                    properties = %event.properties,
                    "Analytics event"
                );
            }
        });

        Self { sender }
    }
}

impl AnalyticsSink for AnalyticsService {
    fn capture(&self, event: AnalyticsEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(event = %event.event, "Analytics queue is full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                tracing::error!(event = %event.event, "Analytics channel is closed, dropping event");
            }
        }
    }
}

/// Sink used when analytics are disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn capture(&self, event: AnalyticsEvent) {
        tracing::trace!(event = %event.event, "Analytics disabled, event discarded");
    }
}
