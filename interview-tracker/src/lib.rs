//! # Interview Tracker
//!
//! Pipeline stage state machine and health evaluation for tracking job
//! applications through interview rounds.
//!
//! The crate provides:
//!
//! - **Stage graph**: the legal moves between interview stages, with typed
//!   rejection reasons
//! - **Health evaluation**: a pure classifier over stage, recency and
//!   interview state
//! - **Pipeline service**: validated stage changes over an injected store
//!   and event sink
//! - **Dashboard metrics**: aggregate counts and rates over a snapshot
//! - **Reminders**: interview, prep and follow-up notices due at a given
//!   instant
//!
//! ## Quick Start
//!
//! ```rust
//! use interview_tracker::prelude::*;
//!
//! assert!(can_transition(Stage::Applied, Stage::TechRound1));
//! assert_eq!(progress_percentage(Stage::HmRound), 71);
//!
//! let err = validate_transition(Stage::Applied, Stage::Offer).unwrap_err();
//! assert_eq!(err.kind, TransitionErrorKind::IllegalTransition);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod graph;
pub mod health;
pub mod interviews;
pub mod metrics;
pub mod observability;
pub mod reminders;
pub mod service;
pub mod store;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{HealthThresholds, TrackerConfig};
    pub use crate::core::{
        Interview, InterviewMode, InterviewOutcome, Pipeline, PipelineHealth, PrepStatus,
        Priority, Stage,
    };
    pub use crate::errors::{TrackerError, TransitionError, TransitionErrorKind};
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, PipelineEvent,
    };
    pub use crate::graph::{
        can_transition, is_progressing, is_terminal, next_logical_stages, progress_percentage,
        transitions, validate_transition,
    };
    pub use crate::health::{
        attention_list, evaluate_health, AttentionItem, HealthEvaluator, HealthReport,
        HealthSignal,
    };
    pub use crate::interviews::{
        interviews_needing_follow_up, interviews_needing_prep, pending_outcomes, InterviewRef,
    };
    pub use crate::metrics::{upcoming_interviews, DashboardMetrics, UpcomingInterview};
    pub use crate::reminders::{reminders, Reminder, ReminderKind};
    pub use crate::service::{NewPipeline, PipelineService};
    pub use crate::store::{InMemoryPipelineStore, PipelineStore};
    pub use crate::utils::{now_utc, parse_timestamp, Timestamp};
}
