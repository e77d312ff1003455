//! Interview queries over a snapshot of pipelines.
//!
//! Each query borrows from the snapshot and pairs the interview with the
//! pipeline it belongs to.

use chrono::Duration;

use crate::core::{Interview, InterviewOutcome, Pipeline, PrepStatus};
use crate::utils::Timestamp;

/// An interview together with its pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterviewRef<'a> {
    /// Owning pipeline.
    pub pipeline: &'a Pipeline,
    /// The interview.
    pub interview: &'a Interview,
}

impl InterviewRef<'_> {
    /// Scheduled time. Every query result is scheduled.
    #[must_use]
    pub fn scheduled_at(&self) -> Option<Timestamp> {
        self.interview.scheduled_at
    }
}

fn scheduled<'a>(
    pipelines: &'a [Pipeline],
) -> impl Iterator<Item = (InterviewRef<'a>, Timestamp)> + 'a {
    pipelines.iter().flat_map(|pipeline| {
        pipeline.interviews.iter().filter_map(move |interview| {
            interview
                .scheduled_at
                .map(|at| (InterviewRef { pipeline, interview }, at))
        })
    })
}

fn collect_sorted<'a>(
    mut found: Vec<(InterviewRef<'a>, Timestamp)>,
    newest_first: bool,
) -> Vec<InterviewRef<'a>> {
    if newest_first {
        found.sort_by(|a, b| b.1.cmp(&a.1));
    } else {
        found.sort_by_key(|(_, at)| *at);
    }
    found.into_iter().map(|(r, _)| r).collect()
}

/// Interviews that already happened but still have a pending outcome,
/// most recent first.
#[must_use]
pub fn pending_outcomes(pipelines: &[Pipeline], now: Timestamp) -> Vec<InterviewRef<'_>> {
    let found = scheduled(pipelines)
        .filter(|(r, at)| *at < now && r.interview.outcome == InterviewOutcome::Pending)
        .collect();
    collect_sorted(found, true)
}

/// Pending interviews in the next `days_ahead` days whose prep is not
/// ready, soonest first. Both ends of the window are inclusive.
#[must_use]
pub fn interviews_needing_prep(
    pipelines: &[Pipeline],
    now: Timestamp,
    days_ahead: u32,
) -> Vec<InterviewRef<'_>> {
    let until = now + Duration::days(i64::from(days_ahead));
    let found = scheduled(pipelines)
        .filter(|(r, at)| {
            (now..=until).contains(at)
                && r.interview.outcome == InterviewOutcome::Pending
                && r.interview.prep_status != PrepStatus::Ready
        })
        .collect();
    collect_sorted(found, false)
}

/// Interviews held more than a day ago with no thank-you note sent,
/// most recent first. Failed interviews are skipped.
#[must_use]
pub fn interviews_needing_follow_up(pipelines: &[Pipeline], now: Timestamp) -> Vec<InterviewRef<'_>> {
    let cutoff = now - Duration::days(1);
    let found = scheduled(pipelines)
        .filter(|(r, at)| {
            *at < cutoff
                && !r.interview.thank_you_sent
                && r.interview.outcome != InterviewOutcome::Failed
        })
        .collect();
    collect_sorted(found, true)
}
