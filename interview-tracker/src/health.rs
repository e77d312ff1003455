//! Pipeline health classification.
//!
//! Health is derived on every call and never stored. The rules below are
//! evaluated in priority order and the first match wins; several conditions
//! can hold at once, so the order is the contract:
//!
//! 1. terminal stage: [`PipelineHealth::Closed`]
//! 2. any interview scheduled after `now`: [`PipelineHealth::Active`]
//! 3. interviews in the past still pending: [`PipelineHealth::Awaiting`], or
//!    [`PipelineHealth::NeedsFollowup`] once the oldest has waited too long
//! 4. days since the last update: `Active`, `NeedsFollowup` or
//!    [`PipelineHealth::Stale`]
//!
//! All comparisons are strict and every threshold is exclusive.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::HealthThresholds;
use crate::core::{Interview, Pipeline, PipelineHealth, Stage};
use crate::graph;
use crate::utils::{whole_days_between, Timestamp};

/// What drove a health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthSignal {
    /// The pipeline is in a terminal stage.
    TerminalStage,
    /// An interview is scheduled in the future.
    UpcomingInterview,
    /// The oldest past interview without an outcome has waited this long.
    AwaitingResult {
        /// Whole days since the oldest pending interview.
        days_waiting: i64,
    },
    /// Time since the pipeline was last updated.
    SinceUpdate {
        /// Whole days since the last update.
        days: i64,
    },
    /// No timestamp to judge by.
    NoSignal,
}

/// Result of evaluating a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// The classification.
    pub health: PipelineHealth,
    /// Human-readable explanation.
    pub reason: String,
    /// The rule that matched.
    pub signal: HealthSignal,
}

impl HealthReport {
    pub(crate) fn new(health: PipelineHealth, signal: HealthSignal, reason: impl Into<String>) -> Self {
        Self {
            health,
            reason: reason.into(),
            signal,
        }
    }
}

/// A pipeline surfaced on the attention list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionItem {
    /// Pipeline ID.
    pub pipeline_id: Uuid,
    /// Company name.
    pub company: String,
    /// Role title.
    pub role: String,
    /// Current stage.
    pub stage: Stage,
    /// Health at evaluation time.
    pub health: PipelineHealth,
    /// Why the pipeline needs attention.
    pub reason: String,
}

/// Classifies pipelines by how urgently they need attention.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthEvaluator {
    thresholds: HealthThresholds,
}

impl HealthEvaluator {
    /// Creates an evaluator with the given thresholds.
    #[must_use]
    pub fn new(thresholds: HealthThresholds) -> Self {
        Self { thresholds }
    }

    /// Returns the thresholds in use.
    #[must_use]
    pub fn thresholds(&self) -> &HealthThresholds {
        &self.thresholds
    }

    /// Evaluates a pipeline at `now`.
    #[must_use]
    pub fn evaluate(&self, pipeline: &Pipeline, now: Timestamp) -> HealthReport {
        let report = self.classify(pipeline.stage, pipeline.updated_at, &pipeline.interviews, now);
        debug!(
            pipeline_id = %pipeline.id,
            stage = %pipeline.stage,
            health = %report.health,
            "Evaluated pipeline health"
        );
        report
    }

    /// Evaluates from the raw parts a pipeline exposes.
    ///
    /// Total over its inputs: unscheduled interviews and a missing
    /// `updated_at` carry no signal and fall through to the next rule.
    #[must_use]
    pub fn classify(
        &self,
        stage: Stage,
        updated_at: Option<Timestamp>,
        interviews: &[Interview],
        now: Timestamp,
    ) -> HealthReport {
        if graph::is_terminal(stage) {
            return HealthReport::new(
                PipelineHealth::Closed,
                HealthSignal::TerminalStage,
                "Terminal stage reached",
            );
        }

        if interviews.iter().any(|i| i.is_upcoming(now)) {
            return HealthReport::new(
                PipelineHealth::Active,
                HealthSignal::UpcomingInterview,
                "Upcoming interview scheduled",
            );
        }

        if let Some(oldest) = oldest_awaiting_result(interviews, now) {
            let days_waiting = whole_days_between(oldest, now);
            let signal = HealthSignal::AwaitingResult { days_waiting };
            if days_waiting > self.thresholds.followup_after_days {
                return HealthReport::new(
                    PipelineHealth::NeedsFollowup,
                    signal,
                    format!("Awaiting response for {days_waiting} days"),
                );
            }
            return HealthReport::new(
                PipelineHealth::Awaiting,
                signal,
                "Interview completed, outcome pending",
            );
        }

        let Some(updated_at) = updated_at else {
            return HealthReport::new(
                PipelineHealth::Active,
                HealthSignal::NoSignal,
                "No update time recorded",
            );
        };

        let days = whole_days_between(updated_at, now);
        let signal = HealthSignal::SinceUpdate { days };
        if days > self.thresholds.stale_after_days {
            HealthReport::new(
                PipelineHealth::Stale,
                signal,
                format!("Stale - no updates for {days} days"),
            )
        } else if days > self.thresholds.followup_after_days {
            HealthReport::new(
                PipelineHealth::NeedsFollowup,
                signal,
                format!("No activity for {days} days"),
            )
        } else {
            HealthReport::new(
                PipelineHealth::Active,
                signal,
                format!("Updated {days} days ago"),
            )
        }
    }

    /// Pipelines needing the user's attention, in input order.
    ///
    /// Includes every `NeedsFollowup` and `Stale` pipeline, plus `Awaiting`
    /// pipelines whose oldest pending interview has waited longer than the
    /// attention threshold. That threshold is lower than the follow-up one,
    /// so borderline cases show up here before their health changes.
    #[must_use]
    pub fn attention_list(&self, pipelines: &[Pipeline], now: Timestamp) -> Vec<AttentionItem> {
        let items: Vec<AttentionItem> = pipelines
            .iter()
            .filter_map(|pipeline| {
                let report = self.evaluate(pipeline, now);
                let reason = match (report.health, report.signal) {
                    (PipelineHealth::NeedsFollowup | PipelineHealth::Stale, _) => report.reason,
                    (PipelineHealth::Awaiting, HealthSignal::AwaitingResult { days_waiting })
                        if days_waiting > self.thresholds.attention_awaiting_after_days =>
                    {
                        format!("Awaiting response for {days_waiting} days")
                    }
                    _ => return None,
                };

                Some(AttentionItem {
                    pipeline_id: pipeline.id,
                    company: pipeline.company.clone(),
                    role: pipeline.role.clone(),
                    stage: pipeline.stage,
                    health: report.health,
                    reason,
                })
            })
            .collect();

        debug!(
            evaluated = pipelines.len(),
            flagged = items.len(),
            "Built attention list"
        );
        items
    }
}

/// Scheduled time of the oldest past interview still awaiting a result.
#[must_use]
pub fn oldest_awaiting_result(interviews: &[Interview], now: Timestamp) -> Option<Timestamp> {
    interviews
        .iter()
        .filter(|i| i.is_awaiting_result(now))
        .filter_map(|i| i.scheduled_at)
        .min()
}

/// Evaluates a pipeline with the default thresholds.
#[must_use]
pub fn evaluate_health(pipeline: &Pipeline, now: Timestamp) -> HealthReport {
    HealthEvaluator::default().evaluate(pipeline, now)
}

/// Builds the attention list with the default thresholds.
#[must_use]
pub fn attention_list(pipelines: &[Pipeline], now: Timestamp) -> Vec<AttentionItem> {
    HealthEvaluator::default().attention_list(pipelines, now)
}
