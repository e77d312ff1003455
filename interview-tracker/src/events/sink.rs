//! Destinations for pipeline events.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::Level;

use super::PipelineEvent;

/// Receives events from [`crate::service::PipelineService`].
///
/// Emission happens after the change it describes has been committed, and
/// must not fail the operation that produced it.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Handles one event.
    async fn emit(&self, event: &PipelineEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: &PipelineEvent) {}
}

/// Writes each event as a structured `tracing` record.
///
/// Rejections are always logged at `WARN`; everything else at the
/// configured level.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl LoggingEventSink {
    /// Creates a sink logging at `level`.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    /// Level used for non-rejection events.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    fn level_for(&self, event: &PipelineEvent) -> Level {
        match event {
            PipelineEvent::TransitionRejected { .. } => Level::WARN,
            _ => self.level,
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &PipelineEvent) {
        let event_type = event.event_type();
        let data = event.data();
        let level = self.level_for(event);
        if level == Level::ERROR {
            tracing::error!(event_type, %data, "Pipeline event");
        } else if level == Level::WARN {
            tracing::warn!(event_type, %data, "Pipeline event");
        } else if level == Level::INFO {
            tracing::info!(event_type, %data, "Pipeline event");
        } else if level == Level::DEBUG {
            tracing::debug!(event_type, %data, "Pipeline event");
        } else {
            tracing::trace!(event_type, %data, "Pipeline event");
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything collected so far.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().clone()
    }

    /// JSON payloads of the events whose type is exactly `event_type`.
    #[must_use]
    pub fn payloads_of_type(&self, event_type: &str) -> Vec<serde_json::Value> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .map(PipelineEvent::data)
            .collect()
    }

    /// Number of events collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Forgets everything collected.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: &PipelineEvent) {
        self.events.lock().push(event.clone());
    }
}
