//! Dashboard metrics computed over a snapshot of pipelines.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::HealthThresholds;
use crate::core::{InterviewOutcome, Pipeline, PipelineHealth, PrepStatus, Stage};
use crate::graph;
use crate::health::HealthEvaluator;
use crate::utils::Timestamp;

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Pipelines not in a terminal stage.
    pub total_active_pipelines: usize,
    /// Interviews with a passed or failed outcome.
    pub total_interviews_completed: usize,
    /// Interviews scheduled Monday through Sunday of the current week.
    pub interviews_this_week: usize,
    /// Passed / decided, as a percentage with one decimal.
    pub pass_rate: f64,
    /// Mean self-rated confidence, two decimals.
    pub average_confidence: f64,
    /// Active pipelines that need follow-up or are stale.
    pub pending_follow_ups: usize,
    /// Pipelines at Offer.
    pub offers_received: usize,
    /// Pipelines at Rejected.
    pub rejections: usize,
    /// Mean days from application to a terminal stage, one decimal.
    pub avg_days_in_pipeline: f64,
    /// Pipelines per stage, excluding Rejected and Dropped.
    pub stage_distribution: BTreeMap<Stage, usize>,
}

impl DashboardMetrics {
    /// Computes every metric at `now`.
    #[must_use]
    pub fn compute(pipelines: &[Pipeline], now: Timestamp, thresholds: HealthThresholds) -> Self {
        let interviews = || pipelines.iter().flat_map(|p| p.interviews.iter());

        let passed = interviews()
            .filter(|i| i.outcome == InterviewOutcome::Passed)
            .count();
        let failed = interviews()
            .filter(|i| i.outcome == InterviewOutcome::Failed)
            .count();

        let confidences: Vec<u8> = interviews().filter_map(|i| i.confidence).collect();

        let (week_start, week_end) = week_bounds(now.date_naive());
        let interviews_this_week = interviews()
            .filter_map(|i| i.scheduled_at)
            .filter(|at| (week_start..=week_end).contains(&at.date_naive()))
            .count();

        let active: Vec<Pipeline> = pipelines
            .iter()
            .filter(|p| !graph::is_terminal(p.stage))
            .cloned()
            .collect();
        let pending_follow_ups = HealthEvaluator::new(thresholds)
            .attention_list(&active, now)
            .iter()
            .filter(|item| {
                matches!(
                    item.health,
                    PipelineHealth::NeedsFollowup | PipelineHealth::Stale
                )
            })
            .count();

        let mut stage_distribution = BTreeMap::new();
        for pipeline in pipelines.iter().filter(|p| !graph::is_negative_terminal(p.stage)) {
            *stage_distribution.entry(pipeline.stage).or_insert(0) += 1;
        }

        Self {
            total_active_pipelines: active.len(),
            total_interviews_completed: passed + failed,
            interviews_this_week,
            pass_rate: percentage(passed, passed + failed),
            average_confidence: mean(confidences.iter().map(|&c| i64::from(c)), 2),
            pending_follow_ups,
            offers_received: count_at(pipelines, Stage::Offer),
            rejections: count_at(pipelines, Stage::Rejected),
            avg_days_in_pipeline: avg_days_to_close(pipelines),
            stage_distribution,
        }
    }
}

/// An upcoming interview with its pipeline context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingInterview {
    /// Interview ID.
    pub interview_id: Uuid,
    /// Pipeline ID.
    pub pipeline_id: Uuid,
    /// Company name.
    pub company: String,
    /// Role title.
    pub role: String,
    /// Interview stage.
    pub stage: Stage,
    /// Scheduled time.
    pub scheduled_at: Timestamp,
    /// Preparation status.
    pub prep_status: PrepStatus,
    /// Calendar days from today until the interview.
    pub days_until: i64,
}

/// The next `limit` pending interviews scheduled at or after `now`, soonest first.
#[must_use]
pub fn upcoming_interviews(pipelines: &[Pipeline], now: Timestamp, limit: usize) -> Vec<UpcomingInterview> {
    let today = now.date_naive();
    let mut upcoming: Vec<UpcomingInterview> = pipelines
        .iter()
        .flat_map(|pipeline| {
            pipeline.interviews.iter().filter_map(move |interview| {
                let scheduled_at = interview.scheduled_at?;
                if scheduled_at < now || interview.outcome != InterviewOutcome::Pending {
                    return None;
                }
                Some(UpcomingInterview {
                    interview_id: interview.id,
                    pipeline_id: pipeline.id,
                    company: pipeline.company.clone(),
                    role: pipeline.role.clone(),
                    stage: interview.stage,
                    scheduled_at,
                    prep_status: interview.prep_status,
                    days_until: (scheduled_at.date_naive() - today).num_days(),
                })
            })
        })
        .collect();

    upcoming.sort_by_key(|u| u.scheduled_at);
    upcoming.truncate(limit);
    upcoming
}

/// Activity since Monday of the current week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
    /// Monday of the current week.
    pub week_start: NaiveDate,
    /// Interviews scheduled since Monday.
    pub interviews_scheduled: usize,
    /// Pipelines created since Monday.
    pub new_applications: usize,
    /// Interviews passed since Monday.
    pub interviews_passed: usize,
    /// Interviews failed since Monday.
    pub interviews_failed: usize,
}

impl WeeklySummary {
    /// Summarises the week containing `now`.
    #[must_use]
    pub fn compute(pipelines: &[Pipeline], now: Timestamp) -> Self {
        let (week_start, _) = week_bounds(now.date_naive());
        let since_monday = |at: Timestamp| at.date_naive() >= week_start;
        let interviews = || pipelines.iter().flat_map(|p| p.interviews.iter());
        let completed_with = |outcome: InterviewOutcome| {
            interviews()
                .filter(|i| i.outcome == outcome && i.completed_at.is_some_and(since_monday))
                .count()
        };

        Self {
            week_start,
            interviews_scheduled: interviews()
                .filter(|i| i.scheduled_at.is_some_and(since_monday))
                .count(),
            new_applications: pipelines.iter().filter(|p| since_monday(p.created_at)).count(),
            interviews_passed: completed_with(InterviewOutcome::Passed),
            interviews_failed: completed_with(InterviewOutcome::Failed),
        }
    }
}

fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(today.weekday().num_days_from_monday());
    let start = today.checked_sub_days(Days::new(offset)).unwrap_or(today);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    (start, end)
}

fn count_at(pipelines: &[Pipeline], stage: Stage) -> usize {
    pipelines.iter().filter(|p| p.stage == stage).count()
}

fn avg_days_to_close(pipelines: &[Pipeline]) -> f64 {
    let days = pipelines
        .iter()
        .filter(|p| graph::is_terminal(p.stage))
        .map(|p| {
            let closed_on = p.updated_at.unwrap_or(p.created_at).date_naive();
            (closed_on - p.applied_on).num_days()
        });
    mean(days, 1)
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 / total as f64 * 100.0, 1)
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = i64>, decimals: i32) -> f64 {
    let (sum, count) = values.fold((0_i64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }
    round_to(sum as f64 / count as f64, decimals)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
