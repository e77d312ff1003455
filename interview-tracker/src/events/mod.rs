//! Pipeline lifecycle events.
//!
//! Services describe what happened as a [`PipelineEvent`] and hand it to an
//! injected [`EventSink`]. There is no process-wide sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use serde_json::json;
use uuid::Uuid;

use crate::core::Stage;
use crate::errors::TransitionError;
use crate::graph;
use crate::utils::{format_iso8601, Timestamp};

/// Something that happened to a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A pipeline was created.
    Created {
        /// Pipeline ID.
        pipeline_id: Uuid,
        /// Company name.
        company: String,
    },
    /// A validated stage change was committed.
    StageChanged {
        /// Pipeline ID.
        pipeline_id: Uuid,
        /// Previous stage.
        from: Stage,
        /// New stage.
        to: Stage,
        /// When the change was committed.
        at: Timestamp,
    },
    /// A stage change was refused.
    TransitionRejected {
        /// Pipeline ID.
        pipeline_id: Uuid,
        /// The refusal.
        error: TransitionError,
    },
    /// A pipeline was deleted.
    Deleted {
        /// Pipeline ID.
        pipeline_id: Uuid,
    },
}

impl PipelineEvent {
    /// Event type string.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => "pipeline.created",
            Self::StageChanged { .. } => "pipeline.stage_changed",
            Self::TransitionRejected { .. } => "pipeline.transition_rejected",
            Self::Deleted { .. } => "pipeline.deleted",
        }
    }

    /// JSON payload.
    #[must_use]
    pub fn data(&self) -> serde_json::Value {
        match self {
            Self::Created {
                pipeline_id,
                company,
            } => json!({
                "pipeline_id": pipeline_id.to_string(),
                "company": company,
            }),
            Self::StageChanged {
                pipeline_id,
                from,
                to,
                at,
            } => json!({
                "pipeline_id": pipeline_id.to_string(),
                "from_stage": from,
                "to_stage": to,
                "changed_at": format_iso8601(at),
                "progressing": graph::is_progressing(*from, *to),
                "progress_percentage": graph::progress_percentage(*to),
            }),
            Self::TransitionRejected { pipeline_id, error } => json!({
                "pipeline_id": pipeline_id.to_string(),
                "kind": error.kind,
                "from_stage": error.from,
                "to_stage": error.to,
                "message": error.message,
            }),
            Self::Deleted { pipeline_id } => json!({
                "pipeline_id": pipeline_id.to_string(),
            }),
        }
    }
}
