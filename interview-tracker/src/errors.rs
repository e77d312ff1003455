//! Error types for the interview tracker.
//!
//! Stage-change validation reports a categorized [`TransitionError`]; every
//! other failure in the crate is a [`TrackerError`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::core::Stage;
use crate::graph;
use crate::utils::TimestampError;

/// The main error type for interview tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A stage change was rejected by the stage graph.
    #[error("{0}")]
    Transition(#[from] TransitionError),

    /// A pipeline or interview does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record looked up.
        entity: &'static str,
        /// The missing ID.
        id: Uuid,
    },

    /// A stage string did not name a known stage.
    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A timestamp could not be parsed.
    #[error("{0}")]
    Timestamp(#[from] TimestampError),
}

impl TrackerError {
    /// Creates a pipeline-not-found error.
    #[must_use]
    pub fn pipeline_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Pipeline",
            id,
        }
    }

    /// Creates an interview-not-found error.
    #[must_use]
    pub fn interview_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Interview",
            id,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = match self {
            Self::Transition(err) => err.to_dict(),
            Self::NotFound { entity, id } => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("NotFound"));
                map.insert("entity".to_string(), serde_json::json!(entity));
                map.insert("id".to_string(), serde_json::json!(id.to_string()));
                map
            }
            Self::UnknownStage(value) => {
                let mut map = HashMap::new();
                map.insert("type".to_string(), serde_json::json!("UnknownStage"));
                map.insert("value".to_string(), serde_json::json!(value));
                map
            }
            Self::Store(_) => single_type_map("StoreError"),
            Self::Config(_) => single_type_map("ConfigError"),
            Self::Timestamp(_) => single_type_map("TimestampError"),
        };

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

fn single_type_map(kind: &str) -> HashMap<String, serde_json::Value> {
    let mut map = HashMap::new();
    map.insert("type".to_string(), serde_json::json!(kind));
    map
}

/// Category of a rejected stage transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionErrorKind {
    /// The proposed stage equals the current stage.
    SameStage,
    /// The current stage is terminal and admits no further moves.
    FromTerminal,
    /// The proposed stage is not reachable in one step.
    IllegalTransition,
}

impl fmt::Display for TransitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameStage => write!(f, "same_stage"),
            Self::FromTerminal => write!(f, "from_terminal"),
            Self::IllegalTransition => write!(f, "illegal_transition"),
        }
    }
}

/// Error returned when a proposed stage change is not legal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransitionError {
    /// Why the transition was rejected.
    pub kind: TransitionErrorKind,
    /// Current stage.
    pub from: Stage,
    /// Proposed stage.
    pub to: Stage,
    /// Legal next stages from `from`; only populated for illegal transitions.
    pub allowed: Vec<Stage>,
    /// Message suitable for showing to the user verbatim.
    pub message: String,
}

impl TransitionError {
    /// Creates a same-stage error.
    #[must_use]
    pub fn same_stage(stage: Stage) -> Self {
        Self {
            kind: TransitionErrorKind::SameStage,
            from: stage,
            to: stage,
            allowed: Vec::new(),
            message: "Cannot transition to the same stage".to_string(),
        }
    }

    /// Creates a from-terminal error.
    #[must_use]
    pub fn from_terminal(from: Stage, to: Stage) -> Self {
        Self {
            kind: TransitionErrorKind::FromTerminal,
            from,
            to,
            allowed: Vec::new(),
            message: format!("Cannot transition from terminal stage: {}", graph::label(from)),
        }
    }

    /// Creates an illegal-transition error listing the legal alternatives.
    #[must_use]
    pub fn illegal(from: Stage, to: Stage, allowed: &[Stage]) -> Self {
        let options = allowed
            .iter()
            .map(|s| graph::label(*s))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            kind: TransitionErrorKind::IllegalTransition,
            from,
            to,
            allowed: allowed.to_vec(),
            message: format!(
                "Invalid transition from {} to {}. Valid options: {}",
                graph::label(from),
                graph::label(to),
                options
            ),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("TransitionError"));
        map.insert("kind".to_string(), serde_json::json!(self.kind));
        map.insert("from_stage".to_string(), serde_json::json!(self.from));
        map.insert("to_stage".to_string(), serde_json::json!(self.to));
        if !self.allowed.is_empty() {
            map.insert("allowed".to_string(), serde_json::json!(self.allowed));
        }
        map.insert("message".to_string(), serde_json::json!(self.message));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_stage_message() {
        let err = TransitionError::same_stage(Stage::HmRound);
        assert_eq!(err.kind, TransitionErrorKind::SameStage);
        assert_eq!(err.to_string(), "Cannot transition to the same stage");
    }

    #[test]
    fn test_from_terminal_uses_label() {
        let err = TransitionError::from_terminal(Stage::Rejected, Stage::Applied);
        assert_eq!(err.to_string(), "Cannot transition from terminal stage: Rejected");
    }

    #[test]
    fn test_illegal_lists_options() {
        let err = TransitionError::illegal(Stage::Offer, Stage::Applied, &[Stage::Dropped]);
        assert_eq!(
            err.to_string(),
            "Invalid transition from Offer to Applied. Valid options: Dropped"
        );
        assert_eq!(err.allowed, vec![Stage::Dropped]);
    }

    #[test]
    fn test_transition_error_to_dict() {
        let err = TransitionError::illegal(
            Stage::RecruiterScreen,
            Stage::Offer,
            &[Stage::TechRound1, Stage::Rejected, Stage::Dropped],
        );
        let dict = err.to_dict();

        assert_eq!(dict.get("kind").unwrap(), "illegal_transition");
        assert_eq!(dict.get("from_stage").unwrap(), "recruiter_screen");
        assert_eq!(dict.get("to_stage").unwrap(), "offer");
        assert_eq!(
            dict.get("allowed").unwrap(),
            &serde_json::json!(["tech_round_1", "rejected", "dropped"])
        );
    }

    #[test]
    fn test_tracker_error_wraps_transition() {
        let err: TrackerError = TransitionError::same_stage(Stage::Applied).into();
        assert_eq!(err.to_string(), "Cannot transition to the same stage");
        assert_eq!(err.to_dict().get("type").unwrap(), "TransitionError");
    }

    #[test]
    fn test_not_found_to_dict() {
        let id = Uuid::nil();
        let err = TrackerError::pipeline_not_found(id);
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "NotFound");
        assert_eq!(dict.get("entity").unwrap(), "Pipeline");
        assert_eq!(
            dict.get("message").unwrap(),
            &serde_json::json!(format!("Pipeline not found: {id}"))
        );
    }
}
