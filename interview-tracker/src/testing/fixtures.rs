//! Pipeline fixtures.

use chrono::{Duration, TimeZone, Utc};

use crate::core::{Interview, InterviewOutcome, Pipeline, Stage};
use crate::utils::Timestamp;

/// A fixed reference instant, 2024-03-15 12:00:00 UTC (a Friday).
#[must_use]
pub fn fixed_now() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Builds pipelines relative to a reference instant.
///
/// Ages are whole days before `now`; interview offsets may be negative
/// (past) or positive (future).
#[derive(Debug, Clone)]
pub struct PipelineFixture {
    now: Timestamp,
    pipeline: Pipeline,
}

impl PipelineFixture {
    /// Starts a pipeline created at `now` with the given company.
    #[must_use]
    pub fn new(company: impl Into<String>, now: Timestamp) -> Self {
        Self {
            now,
            pipeline: Pipeline::new(company, "Software Engineer", now),
        }
    }

    /// Starts a pipeline at [`fixed_now`].
    #[must_use]
    pub fn at_fixed_now(company: impl Into<String>) -> Self {
        Self::new(company, fixed_now())
    }

    /// Sets the stage.
    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.pipeline.stage = stage;
        self
    }

    /// Sets the role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.pipeline.role = role.into();
        self
    }

    /// Last update `days` before now.
    #[must_use]
    pub fn updated_days_ago(mut self, days: i64) -> Self {
        self.pipeline.updated_at = Some(self.now - Duration::days(days));
        self
    }

    /// Clears the last update time.
    #[must_use]
    pub fn never_updated(mut self) -> Self {
        self.pipeline.updated_at = None;
        self
    }

    /// Adds a pending interview scheduled `offset` from now.
    #[must_use]
    pub fn interview_in(self, offset: Duration) -> Self {
        self.interview(offset, InterviewOutcome::Pending)
    }

    /// Adds an interview scheduled `offset` from now with `outcome`.
    #[must_use]
    pub fn interview(mut self, offset: Duration, outcome: InterviewOutcome) -> Self {
        let interview = Interview::new(self.pipeline.id, self.pipeline.stage)
            .with_scheduled_at(self.now + offset)
            .with_outcome(outcome);
        self.pipeline = self.pipeline.with_interview(interview);
        self
    }

    /// Adds an interview with no scheduled time.
    #[must_use]
    pub fn unscheduled_interview(mut self) -> Self {
        let interview = Interview::new(self.pipeline.id, self.pipeline.stage);
        self.pipeline = self.pipeline.with_interview(interview);
        self
    }

    /// Finishes the fixture.
    #[must_use]
    pub fn build(self) -> Pipeline {
        self.pipeline
    }
}
