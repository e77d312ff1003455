//! Pipeline and interview records as seen by the state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{InterviewMode, InterviewOutcome, PrepStatus, Priority, Stage};
use crate::utils::{whole_days_between, Timestamp};

/// A single interview belonging to one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    /// Interview ID.
    pub id: Uuid,
    /// Owning pipeline.
    pub pipeline_id: Uuid,
    /// Stage the interview belongs to.
    pub stage: Stage,
    /// Round number within the stage.
    #[serde(default = "default_round")]
    pub round_number: u32,
    /// When the interview takes place, if scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Timestamp>,
    /// Expected length.
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Delivery mode.
    #[serde(default)]
    pub mode: InterviewMode,
    /// Result.
    #[serde(default)]
    pub outcome: InterviewOutcome,
    /// Preparation progress.
    #[serde(default)]
    pub prep_status: PrepStatus,
    /// Self-reported confidence, 1 to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    /// When the outcome was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    /// Whether a thank-you note went out after the interview.
    #[serde(default)]
    pub thank_you_sent: bool,
}

fn default_round() -> u32 {
    1
}

fn default_duration() -> u32 {
    60
}

impl Interview {
    /// Creates an unscheduled, pending interview.
    #[must_use]
    pub fn new(pipeline_id: Uuid, stage: Stage) -> Self {
        Self {
            id: Uuid::new_v4(),
            pipeline_id,
            stage,
            round_number: default_round(),
            scheduled_at: None,
            duration_minutes: default_duration(),
            mode: InterviewMode::default(),
            outcome: InterviewOutcome::default(),
            prep_status: PrepStatus::default(),
            confidence: None,
            completed_at: None,
            thank_you_sent: false,
        }
    }

    /// Sets the scheduled time.
    #[must_use]
    pub fn with_scheduled_at(mut self, at: Timestamp) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    /// Sets the outcome.
    #[must_use]
    pub fn with_outcome(mut self, outcome: InterviewOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Sets the delivery mode.
    #[must_use]
    pub fn with_mode(mut self, mode: InterviewMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the round number.
    #[must_use]
    pub fn with_round(mut self, round_number: u32) -> Self {
        self.round_number = round_number;
        self
    }

    /// Sets the self-reported confidence, clamped to 1..=5.
    #[must_use]
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = Some(confidence.clamp(1, 5));
        self
    }

    /// Sets the preparation status.
    #[must_use]
    pub fn with_prep_status(mut self, status: PrepStatus) -> Self {
        self.prep_status = status;
        self
    }

    /// Marks the thank-you note as sent.
    #[must_use]
    pub fn with_thank_you_sent(mut self, sent: bool) -> Self {
        self.thank_you_sent = sent;
        self
    }

    /// Returns true if the interview is scheduled strictly after `now`.
    #[must_use]
    pub fn is_upcoming(&self, now: Timestamp) -> bool {
        self.scheduled_at.is_some_and(|at| at > now)
    }

    /// Returns true if the interview took place strictly before `now` and
    /// its outcome is still pending.
    #[must_use]
    pub fn is_awaiting_result(&self, now: Timestamp) -> bool {
        self.outcome == InterviewOutcome::Pending && self.scheduled_at.is_some_and(|at| at < now)
    }
}

/// One company/role application and its interviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline ID.
    pub id: Uuid,
    /// Company name.
    pub company: String,
    /// Role title.
    pub role: String,
    /// Current stage.
    #[serde(default)]
    pub stage: Stage,
    /// User-assigned priority.
    #[serde(default)]
    pub priority: Priority,
    /// Date the application was submitted.
    pub applied_on: NaiveDate,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    /// Interviews, in insertion order.
    #[serde(default)]
    pub interviews: Vec<Interview>,
}

impl Pipeline {
    /// Creates a pipeline at [`Stage::Applied`], applied and updated at `now`.
    #[must_use]
    pub fn new(company: impl Into<String>, role: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            company: company.into(),
            role: role.into(),
            stage: Stage::Applied,
            priority: Priority::default(),
            applied_on: now.date_naive(),
            created_at: now,
            updated_at: Some(now),
            interviews: Vec::new(),
        }
    }

    /// Sets the current stage.
    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// Sets the last update time.
    #[must_use]
    pub fn with_updated_at(mut self, updated_at: Option<Timestamp>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the application date.
    #[must_use]
    pub fn with_applied_on(mut self, applied_on: NaiveDate) -> Self {
        self.applied_on = applied_on;
        self
    }

    /// Appends an interview, re-parenting it onto this pipeline.
    #[must_use]
    pub fn with_interview(mut self, mut interview: Interview) -> Self {
        interview.pipeline_id = self.id;
        self.interviews.push(interview);
        self
    }

    /// Whole days since the last update, if the pipeline has one.
    #[must_use]
    pub fn days_since_update(&self, now: Timestamp) -> Option<i64> {
        self.updated_at.map(|at| whole_days_between(at, now))
    }

    /// Looks up an interview by ID.
    #[must_use]
    pub fn interview(&self, id: Uuid) -> Option<&Interview> {
        self.interviews.iter().find(|i| i.id == id)
    }

    /// Looks up an interview by ID for mutation.
    pub fn interview_mut(&mut self, id: Uuid) -> Option<&mut Interview> {
        self.interviews.iter_mut().find(|i| i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_pipeline_defaults() {
        let p = Pipeline::new("Acme", "Backend Engineer", now());
        assert_eq!(p.stage, Stage::Applied);
        assert_eq!(p.priority, Priority::Medium);
        assert_eq!(p.applied_on, now().date_naive());
        assert_eq!(p.updated_at, Some(now()));
        assert!(p.interviews.is_empty());
    }

    #[test]
    fn test_with_interview_reparents() {
        let p = Pipeline::new("Acme", "SRE", now())
            .with_interview(Interview::new(Uuid::nil(), Stage::TechRound1));
        assert_eq!(p.interviews[0].pipeline_id, p.id);
    }

    #[test]
    fn test_interview_is_upcoming_is_strict() {
        let at_now = Interview::new(Uuid::nil(), Stage::TechRound1).with_scheduled_at(now());
        assert!(!at_now.is_upcoming(now()));
        assert!(!at_now.is_awaiting_result(now()));

        let later = at_now.clone().with_scheduled_at(now() + Duration::minutes(1));
        assert!(later.is_upcoming(now()));
    }

    #[test]
    fn test_unscheduled_interview_gives_no_signal() {
        let i = Interview::new(Uuid::nil(), Stage::HmRound);
        assert!(!i.is_upcoming(now()));
        assert!(!i.is_awaiting_result(now()));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let i = Interview::new(Uuid::nil(), Stage::HmRound).with_confidence(9);
        assert_eq!(i.confidence, Some(5));
    }

    #[test]
    fn test_pipeline_serde_roundtrip_keeps_stage() {
        let p = Pipeline::new("Acme", "SRE", now()).with_stage(Stage::AiRound);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["stage"], "ai_round");
        let back: Pipeline = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
