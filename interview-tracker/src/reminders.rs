//! Reminders derived from a snapshot of pipelines.
//!
//! [`reminders`] is pure: it reports what is due at `now` and leaves
//! scheduling and delivery to the caller.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::HealthThresholds;
use crate::core::{InterviewOutcome, Pipeline, PipelineHealth};
use crate::graph;
use crate::health::HealthEvaluator;
use crate::interviews::{interviews_needing_prep, InterviewRef};
use crate::utils::Timestamp;

const HOUR: i64 = 3600;

/// Window ahead of `now` in which unprepared interviews are considered.
const PREP_LOOKAHEAD_DAYS: u32 = 2;

/// What a reminder is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// An interview starts within the hour.
    InterviewSoon,
    /// An interview starts in 23 to 24 hours.
    InterviewTomorrow,
    /// An interview within a day has prep that is not ready.
    PrepIncomplete,
    /// Some active pipelines need a follow-up.
    FollowUpsNeeded,
}

/// A notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Kind.
    pub kind: ReminderKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Pipeline the reminder is about, if it is about one.
    pub pipeline_id: Option<Uuid>,
    /// Interview the reminder is about, if it is about one.
    pub interview_id: Option<Uuid>,
}

impl Reminder {
    fn for_interview(kind: ReminderKind, title: &str, message: String, r: InterviewRef<'_>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
            pipeline_id: Some(r.pipeline.id),
            interview_id: Some(r.interview.id),
        }
    }
}

/// Every reminder due at `now`.
///
/// Interview reminders come first, soonest interview first, followed by
/// prep reminders and a single follow-up summary.
#[must_use]
pub fn reminders(pipelines: &[Pipeline], now: Timestamp, thresholds: HealthThresholds) -> Vec<Reminder> {
    let mut out = upcoming_interview_reminders(pipelines, now);
    out.extend(prep_reminders(pipelines, now));
    out.extend(follow_up_reminder(pipelines, now, thresholds));
    out
}

fn upcoming_interview_reminders(pipelines: &[Pipeline], now: Timestamp) -> Vec<Reminder> {
    let until = now + Duration::days(1);
    let mut upcoming: Vec<(InterviewRef<'_>, Timestamp)> = pipelines
        .iter()
        .flat_map(|pipeline| {
            pipeline.interviews.iter().filter_map(move |interview| {
                let at = interview.scheduled_at?;
                ((now..=until).contains(&at) && interview.outcome == InterviewOutcome::Pending)
                    .then_some((InterviewRef { pipeline, interview }, at))
            })
        })
        .collect();
    upcoming.sort_by_key(|(_, at)| *at);

    upcoming
        .into_iter()
        .filter_map(|(r, at)| {
            let secs = (at - now).num_seconds();
            let stage = graph::label(r.interview.stage);
            if secs > 0 && secs <= HOUR {
                Some(Reminder::for_interview(
                    ReminderKind::InterviewSoon,
                    "Interview in 1 hour!",
                    format!("{} - {stage}", r.pipeline.company),
                    r,
                ))
            } else if secs > 23 * HOUR && secs <= 24 * HOUR {
                Some(Reminder::for_interview(
                    ReminderKind::InterviewTomorrow,
                    "Interview tomorrow",
                    format!("{} - {stage} at {}", r.pipeline.company, at.format("%H:%M")),
                    r,
                ))
            } else {
                None
            }
        })
        .collect()
}

fn prep_reminders(pipelines: &[Pipeline], now: Timestamp) -> Vec<Reminder> {
    interviews_needing_prep(pipelines, now, PREP_LOOKAHEAD_DAYS)
        .into_iter()
        .filter_map(|r| {
            let secs = (r.scheduled_at()? - now).num_seconds();
            (secs <= 24 * HOUR).then(|| {
                Reminder::for_interview(
                    ReminderKind::PrepIncomplete,
                    "Prep not complete!",
                    format!(
                        "{} interview in {} hours - prep status: {}",
                        r.pipeline.company,
                        secs / HOUR,
                        r.interview.prep_status.label()
                    ),
                    r,
                )
            })
        })
        .collect()
}

fn follow_up_reminder(
    pipelines: &[Pipeline],
    now: Timestamp,
    thresholds: HealthThresholds,
) -> Option<Reminder> {
    let active: Vec<Pipeline> = pipelines
        .iter()
        .filter(|p| !graph::is_terminal(p.stage))
        .cloned()
        .collect();
    let count = HealthEvaluator::new(thresholds)
        .attention_list(&active, now)
        .iter()
        .filter(|item| item.health == PipelineHealth::NeedsFollowup)
        .count();

    (count > 0).then(|| Reminder {
        kind: ReminderKind::FollowUpsNeeded,
        title: "Follow-ups needed".to_string(),
        message: format!("You have {count} pipeline(s) that need follow-up"),
        pipeline_id: None,
        interview_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Interview, PrepStatus, Stage};
    use crate::testing::{fixed_now, PipelineFixture};
    use pretty_assertions::assert_eq;

    fn with_interview_at(offset: Duration, prep: PrepStatus) -> Pipeline {
        let p = PipelineFixture::at_fixed_now("Acme").stage(Stage::TechRound1).build();
        let interview = Interview::new(p.id, Stage::TechRound1)
            .with_scheduled_at(fixed_now() + offset)
            .with_prep_status(prep);
        p.with_interview(interview)
    }

    fn kinds(pipelines: &[Pipeline]) -> Vec<ReminderKind> {
        reminders(pipelines, fixed_now(), HealthThresholds::default())
            .into_iter()
            .map(|r| r.kind)
            .collect()
    }

    #[test]
    fn test_nothing_due() {
        assert!(reminders(&[], fixed_now(), HealthThresholds::default()).is_empty());
        let p = with_interview_at(Duration::hours(30), PrepStatus::NotStarted);
        assert!(kinds(&[p]).is_empty());
    }

    #[test]
    fn test_interview_within_the_hour() {
        let p = with_interview_at(Duration::minutes(60), PrepStatus::Ready);
        let due = reminders(std::slice::from_ref(&p), fixed_now(), HealthThresholds::default());

        assert_eq!(due.len(), 1);
        assert_eq!(due[0].kind, ReminderKind::InterviewSoon);
        assert_eq!(due[0].title, "Interview in 1 hour!");
        assert_eq!(due[0].message, "Acme - Technical Round 1");
        assert_eq!(due[0].pipeline_id, Some(p.id));
        assert_eq!(due[0].interview_id, Some(p.interviews[0].id));
    }

    #[test]
    fn test_hour_window_bounds() {
        assert!(kinds(&[with_interview_at(Duration::zero(), PrepStatus::Ready)]).is_empty());
        assert!(kinds(&[with_interview_at(Duration::minutes(61), PrepStatus::Ready)]).is_empty());
        assert_eq!(
            kinds(&[with_interview_at(Duration::seconds(1), PrepStatus::Ready)]),
            vec![ReminderKind::InterviewSoon]
        );
    }

    #[test]
    fn test_interview_tomorrow_bounds() {
        let due = reminders(
            &[with_interview_at(Duration::hours(24), PrepStatus::Ready)],
            fixed_now(),
            HealthThresholds::default(),
        );
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].kind, ReminderKind::InterviewTomorrow);
        assert_eq!(due[0].message, "Acme - Technical Round 1 at 12:00");

        assert!(kinds(&[with_interview_at(Duration::hours(23), PrepStatus::Ready)]).is_empty());
        assert!(kinds(&[with_interview_at(
            Duration::hours(24) + Duration::seconds(1),
            PrepStatus::Ready
        )])
        .is_empty());
    }

    #[test]
    fn test_prep_incomplete_within_a_day() {
        let p = with_interview_at(Duration::hours(5) + Duration::minutes(30), PrepStatus::InProgress);
        let due = reminders(&[p], fixed_now(), HealthThresholds::default());

        assert_eq!(due.len(), 1);
        assert_eq!(due[0].kind, ReminderKind::PrepIncomplete);
        assert_eq!(due[0].title, "Prep not complete!");
        assert_eq!(due[0].message, "Acme interview in 5 hours - prep status: In Progress");
    }

    #[test]
    fn test_prep_window_bounds() {
        assert_eq!(
            kinds(&[with_interview_at(Duration::hours(24), PrepStatus::NotStarted)]),
            vec![ReminderKind::InterviewTomorrow, ReminderKind::PrepIncomplete]
        );
        assert!(kinds(&[with_interview_at(
            Duration::hours(24) + Duration::seconds(1),
            PrepStatus::NotStarted
        )])
        .is_empty());
        assert_eq!(
            kinds(&[with_interview_at(Duration::minutes(30), PrepStatus::NotStarted)]),
            vec![ReminderKind::InterviewSoon, ReminderKind::PrepIncomplete]
        );
    }

    #[test]
    fn test_decided_interviews_are_ignored() {
        let p = PipelineFixture::at_fixed_now("Acme")
            .stage(Stage::TechRound1)
            .interview(Duration::minutes(30), InterviewOutcome::Rescheduled)
            .build();
        assert!(kinds(&[p]).is_empty());
    }

    #[test]
    fn test_follow_up_summary_counts_active_pipelines() {
        let quiet = |company: &str, stage: Stage| {
            PipelineFixture::at_fixed_now(company)
                .stage(stage)
                .updated_days_ago(7)
                .build()
        };
        let pipelines = vec![
            quiet("Acme", Stage::TechRound1),
            quiet("Globex", Stage::HmRound),
            quiet("Initech", Stage::Rejected),
            PipelineFixture::at_fixed_now("Stale").stage(Stage::TechRound1).updated_days_ago(12).build(),
            PipelineFixture::at_fixed_now("Fresh").stage(Stage::TechRound1).build(),
        ];

        let due = reminders(&pipelines, fixed_now(), HealthThresholds::default());
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].kind, ReminderKind::FollowUpsNeeded);
        assert_eq!(due[0].message, "You have 2 pipeline(s) that need follow-up");
        assert_eq!(due[0].pipeline_id, None);
    }
}
