//! Interview and pipeline status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a single interview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewOutcome {
    /// No result yet.
    #[default]
    Pending,
    /// Candidate passed.
    Passed,
    /// Candidate failed.
    Failed,
    /// Interview was moved.
    Rescheduled,
}

impl fmt::Display for InterviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

impl InterviewOutcome {
    /// Returns true if the interview produced a pass/fail decision.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

/// How an interview is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    /// Video call.
    #[default]
    Video,
    /// Phone call.
    Phone,
    /// In person.
    Onsite,
    /// Take-home assignment.
    TakeHome,
}

impl fmt::Display for InterviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Phone => write!(f, "phone"),
            Self::Onsite => write!(f, "onsite"),
            Self::TakeHome => write!(f, "take_home"),
        }
    }
}

/// Preparation progress for an upcoming interview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepStatus {
    /// Nothing prepared.
    #[default]
    NotStarted,
    /// Preparation underway.
    InProgress,
    /// Ready to go.
    Ready,
}

impl fmt::Display for PrepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

impl PrepStatus {
    /// Display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Ready => "Ready",
        }
    }
}

/// Derived classification of how urgently a pipeline needs attention.
///
/// Never persisted; recomputed by [`crate::health::HealthEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineHealth {
    /// Moving along, nothing to do.
    Active,
    /// Interview done, result outstanding.
    Awaiting,
    /// The user should nudge the company.
    NeedsFollowup,
    /// No activity for a long time.
    Stale,
    /// Pipeline reached a terminal stage.
    Closed,
}

impl fmt::Display for PipelineHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Awaiting => write!(f, "awaiting"),
            Self::NeedsFollowup => write!(f, "needs_followup"),
            Self::Stale => write!(f, "stale"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl PipelineHealth {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Awaiting => "Awaiting Response",
            Self::NeedsFollowup => "Needs Follow-up",
            Self::Stale => "Stale",
            Self::Closed => "Closed",
        }
    }

    /// Hex colour used by dashboards.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Active => "#28a745",
            Self::Awaiting => "#ffc107",
            Self::NeedsFollowup => "#fd7e14",
            Self::Stale => "#dc3545",
            Self::Closed => "#6c757d",
        }
    }

    /// Returns true for the classifications that always land on the attention list.
    #[must_use]
    pub fn needs_action(&self) -> bool {
        matches!(self, Self::NeedsFollowup | Self::Stale)
    }
}

/// User-assigned priority of a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// 1
    Low,
    /// 2
    #[default]
    Medium,
    /// 3
    High,
    /// 4
    VeryHigh,
    /// 5
    Critical,
}

impl Priority {
    /// Numeric level, 1 (low) to 5 (critical).
    #[must_use]
    pub const fn level(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::VeryHigh => 4,
            Self::Critical => 5,
        }
    }
}
