//! Event tracking sink of the experimentation system.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::user::ExperimentUser;

/// Event fired when the user presses the checkout button.
pub const ORDER_PLACED_EVENT: &str = "order_placed";

/// Why an event could not be delivered.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The SDK has not finished initializing.
    #[error("tracking client not ready")]
    NotReady,

    /// Delivery failed.
    #[error("tracking failed: {0}")]
    Delivery(String),
}

/// One conversion event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingEvent {
    pub key: String,
    pub user: ExperimentUser,
    pub tags: Map<String, Value>,
}

/// Receives conversion events.
///
/// Callers treat every failure as non-fatal.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn track(&self, event: TrackingEvent) -> Result<(), TrackingError>;
}

/// Writes events to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn track(&self, event: TrackingEvent) -> Result<(), TrackingError> {
        let tags = serde_json::to_string(&event.tags)
            .map_err(|e| TrackingError::Delivery(e.to_string()))?;
        tracing::info!(event = %event.key, user = %event.user.id, %tags, "tracked event");
        Ok(())
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn track(&self, _event: TrackingEvent) -> Result<(), TrackingError> {
        Ok(())
    }
}
