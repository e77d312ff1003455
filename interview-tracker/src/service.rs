//! Pipeline service: the write path around the stage graph.
//!
//! Every stage change goes through [`crate::graph::validate_transition`]
//! inside [`PipelineStore::modify`], so the check and the write see the same
//! record. Store, event sink and thresholds are injected at construction.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{HealthThresholds, TrackerConfig};
use crate::core::{Interview, InterviewOutcome, Pipeline, PrepStatus, Priority, Stage};
use crate::errors::TrackerError;
use crate::events::{EventSink, NoOpEventSink, PipelineEvent};
use crate::graph;
use crate::health::{AttentionItem, HealthEvaluator, HealthReport};
use crate::reminders::{self, Reminder};
use crate::store::PipelineStore;
use crate::utils::Timestamp;

/// Input for creating a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPipeline {
    /// Company name.
    pub company: String,
    /// Role title.
    pub role: String,
    /// Application date; defaults to the creation day.
    pub applied_on: Option<NaiveDate>,
    /// Priority.
    pub priority: Priority,
}

impl NewPipeline {
    /// Creates input with the default priority.
    #[must_use]
    pub fn new(company: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            role: role.into(),
            applied_on: None,
            priority: Priority::default(),
        }
    }

    /// Sets the application date.
    #[must_use]
    pub fn applied_on(mut self, date: NaiveDate) -> Self {
        self.applied_on = Some(date);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Manages pipelines on top of a [`PipelineStore`].
pub struct PipelineService<S> {
    store: S,
    sink: Arc<dyn EventSink>,
    evaluator: HealthEvaluator,
}

impl<S> std::fmt::Debug for PipelineService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineService")
            .field("thresholds", self.evaluator.thresholds())
            .finish_non_exhaustive()
    }
}

impl<S: PipelineStore> PipelineService<S> {
    /// Creates a service with a no-op sink and default thresholds.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            sink: Arc::new(NoOpEventSink),
            evaluator: HealthEvaluator::default(),
        }
    }

    /// Creates a service with the thresholds and event sink `config` asks for.
    #[must_use]
    pub fn from_config(store: S, config: &TrackerConfig) -> Self {
        Self::new(store)
            .with_sink(config.event_sink())
            .with_thresholds(config.thresholds)
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the health thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.evaluator = HealthEvaluator::new(thresholds);
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a pipeline at [`Stage::Applied`].
    pub async fn create(&self, input: NewPipeline, now: Timestamp) -> Result<Pipeline, TrackerError> {
        let mut pipeline = Pipeline::new(input.company, input.role, now).with_priority(input.priority);
        if let Some(date) = input.applied_on {
            pipeline = pipeline.with_applied_on(date);
        }

        self.store.insert(pipeline.clone()).await?;
        info!(pipeline_id = %pipeline.id, company = %pipeline.company, "Pipeline created");
        self.sink
            .emit(&PipelineEvent::Created {
                pipeline_id: pipeline.id,
                company: pipeline.company.clone(),
            })
            .await;

        Ok(pipeline)
    }

    /// Gets a pipeline by ID.
    pub async fn get(&self, id: Uuid) -> Result<Pipeline, TrackerError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| TrackerError::pipeline_not_found(id))
    }

    /// Deletes a pipeline and its interviews. Returns false if it did not exist.
    pub async fn delete(&self, id: Uuid) -> Result<bool, TrackerError> {
        let removed = self.store.remove(id).await?;
        if removed {
            info!(pipeline_id = %id, "Pipeline deleted");
            self.sink.emit(&PipelineEvent::Deleted { pipeline_id: id }).await;
        }
        Ok(removed)
    }

    /// All pipelines, most recently updated first.
    ///
    /// Rejected and dropped pipelines are left out unless `include_closed`.
    pub async fn all(&self, include_closed: bool) -> Result<Vec<Pipeline>, TrackerError> {
        let mut pipelines: Vec<Pipeline> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|p| include_closed || !graph::is_negative_terminal(p.stage))
            .collect();
        sort_recent_first(&mut pipelines);
        Ok(pipelines)
    }

    /// Pipelines not in a terminal stage, most recently updated first.
    pub async fn active_pipelines(&self) -> Result<Vec<Pipeline>, TrackerError> {
        let mut pipelines: Vec<Pipeline> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|p| !graph::is_terminal(p.stage))
            .collect();
        sort_recent_first(&mut pipelines);
        Ok(pipelines)
    }

    /// Case-insensitive search over company and role.
    pub async fn search(&self, query: &str) -> Result<Vec<Pipeline>, TrackerError> {
        let needle = query.trim().to_lowercase();
        let mut pipelines: Vec<Pipeline> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|p| {
                p.company.to_lowercase().contains(&needle) || p.role.to_lowercase().contains(&needle)
            })
            .collect();
        sort_recent_first(&mut pipelines);
        Ok(pipelines)
    }

    /// Moves a pipeline to `to` if the stage graph allows it.
    ///
    /// # Errors
    ///
    /// `TrackerError::Transition` if the move is illegal, in which case
    /// nothing is written; `TrackerError::NotFound` if the pipeline is missing.
    pub async fn advance_stage(
        &self,
        id: Uuid,
        to: Stage,
        now: Timestamp,
    ) -> Result<Pipeline, TrackerError> {
        let result = self
            .store
            .modify(id, |pipeline| {
                let from = pipeline.stage;
                graph::validate_transition(from, to)?;
                pipeline.stage = to;
                pipeline.updated_at = Some(now);
                Ok((from, pipeline.clone()))
            })
            .await;

        let (from, pipeline) = match result {
            Ok(moved) => moved,
            Err(TrackerError::Transition(error)) => {
                warn!(
                    pipeline_id = %id,
                    from = %error.from,
                    to = %to,
                    kind = %error.kind,
                    "Stage transition rejected"
                );
                self.sink
                    .emit(&PipelineEvent::TransitionRejected {
                        pipeline_id: id,
                        error: error.clone(),
                    })
                    .await;
                return Err(error.into());
            }
            Err(other) => return Err(other),
        };

        info!(
            pipeline_id = %id,
            from = %from,
            to = %to,
            progress = graph::progress_percentage(to),
            "Stage changed"
        );
        self.sink
            .emit(&PipelineEvent::StageChanged {
                pipeline_id: id,
                from,
                to,
                at: now,
            })
            .await;

        Ok(pipeline)
    }

    /// Adds an interview to a pipeline.
    pub async fn add_interview(
        &self,
        id: Uuid,
        interview: Interview,
        now: Timestamp,
    ) -> Result<Interview, TrackerError> {
        let added = self
            .store
            .modify(id, |pipeline| {
                let interview = Interview {
                    pipeline_id: id,
                    ..interview
                };
                pipeline.interviews.push(interview.clone());
                pipeline.updated_at = Some(now);
                Ok(interview)
            })
            .await?;

        info!(pipeline_id = %id, interview_id = %added.id, stage = %added.stage, "Interview added");
        Ok(added)
    }

    /// Records the outcome of an interview.
    ///
    /// Passed and failed outcomes stamp `completed_at`.
    pub async fn record_outcome(
        &self,
        id: Uuid,
        interview_id: Uuid,
        outcome: InterviewOutcome,
        now: Timestamp,
    ) -> Result<Interview, TrackerError> {
        let updated = self
            .store
            .modify(id, |pipeline| {
                pipeline.updated_at = Some(now);
                let interview = interview_in(pipeline, interview_id)?;
                interview.outcome = outcome;
                interview.completed_at = outcome.is_decided().then_some(now);
                Ok(interview.clone())
            })
            .await?;

        info!(pipeline_id = %id, interview_id = %interview_id, outcome = %outcome, "Interview outcome recorded");
        Ok(updated)
    }

    /// Sets the preparation status of an interview, and its confidence when
    /// given. The pipeline's `updated_at` is left alone.
    pub async fn update_prep_status(
        &self,
        id: Uuid,
        interview_id: Uuid,
        status: PrepStatus,
        confidence: Option<u8>,
    ) -> Result<Interview, TrackerError> {
        let updated = self
            .store
            .modify(id, |pipeline| {
                let interview = interview_in(pipeline, interview_id)?;
                interview.prep_status = status;
                if confidence.is_some() {
                    interview.confidence = confidence;
                }
                Ok(interview.clone())
            })
            .await?;

        debug!(pipeline_id = %id, interview_id = %interview_id, prep_status = ?status, "Prep status updated");
        Ok(updated)
    }

    /// Marks the thank-you note for an interview as sent.
    pub async fn mark_thank_you_sent(&self, id: Uuid, interview_id: Uuid) -> Result<Interview, TrackerError> {
        let updated = self
            .store
            .modify(id, |pipeline| {
                let interview = interview_in(pipeline, interview_id)?;
                interview.thank_you_sent = true;
                Ok(interview.clone())
            })
            .await?;

        debug!(pipeline_id = %id, interview_id = %interview_id, "Thank-you note marked sent");
        Ok(updated)
    }

    /// Current health of a pipeline.
    pub async fn health(&self, id: Uuid, now: Timestamp) -> Result<HealthReport, TrackerError> {
        let pipeline = self.get(id).await?;
        Ok(self.evaluator.evaluate(&pipeline, now))
    }

    /// Active pipelines needing attention, most recently updated first.
    pub async fn attention_list(&self, now: Timestamp) -> Result<Vec<AttentionItem>, TrackerError> {
        let active = self.active_pipelines().await?;
        Ok(self.evaluator.attention_list(&active, now))
    }

    /// Reminders due at `now` across every stored pipeline.
    pub async fn reminders(&self, now: Timestamp) -> Result<Vec<Reminder>, TrackerError> {
        let pipelines = self.store.list().await?;
        Ok(reminders::reminders(&pipelines, now, *self.evaluator.thresholds()))
    }

    /// Number of pipelines in each stage. Stages with no pipelines are omitted.
    pub async fn stage_distribution(&self) -> Result<BTreeMap<Stage, usize>, TrackerError> {
        let mut counts = BTreeMap::new();
        for pipeline in self.store.list().await? {
            *counts.entry(pipeline.stage).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

fn interview_in(pipeline: &mut Pipeline, interview_id: Uuid) -> Result<&mut Interview, TrackerError> {
    pipeline
        .interview_mut(interview_id)
        .ok_or_else(|| TrackerError::interview_not_found(interview_id))
}

fn sort_recent_first(pipelines: &mut [Pipeline]) {
    pipelines.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PipelineHealth;
    use crate::errors::TransitionErrorKind;
    use crate::events::CollectingEventSink;
    use crate::reminders::ReminderKind;
    use crate::store::InMemoryPipelineStore;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    /// Delegates to an in-memory store, yielding to the runtime before
    /// every read and write so concurrent calls interleave.
    #[derive(Default)]
    struct YieldingStore {
        inner: InMemoryPipelineStore,
    }

    #[async_trait]
    impl PipelineStore for YieldingStore {
        async fn insert(&self, pipeline: Pipeline) -> Result<(), TrackerError> {
            self.inner.insert(pipeline).await
        }

        async fn get(&self, id: Uuid) -> Result<Option<Pipeline>, TrackerError> {
            let found = self.inner.get(id).await;
            tokio::task::yield_now().await;
            found
        }

        async fn update(&self, pipeline: Pipeline) -> Result<(), TrackerError> {
            tokio::task::yield_now().await;
            self.inner.update(pipeline).await
        }

        async fn modify<T, F>(&self, id: Uuid, f: F) -> Result<T, TrackerError>
        where
            F: FnOnce(&mut Pipeline) -> Result<T, TrackerError> + Send,
            T: Send,
        {
            tokio::task::yield_now().await;
            self.inner.modify(id, f).await
        }

        async fn remove(&self, id: Uuid) -> Result<bool, TrackerError> {
            self.inner.remove(id).await
        }

        async fn list(&self) -> Result<Vec<Pipeline>, TrackerError> {
            self.inner.list().await
        }
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn service() -> (PipelineService<InMemoryPipelineStore>, Arc<CollectingEventSink>) {
        let sink = Arc::new(CollectingEventSink::new());
        let service = PipelineService::new(InMemoryPipelineStore::new()).with_sink(sink.clone());
        (service, sink)
    }

    #[tokio::test]
    async fn test_create_starts_at_applied() {
        let (service, sink) = service();
        let p = service
            .create(NewPipeline::new("Acme", "SRE").priority(Priority::High), now())
            .await
            .unwrap();

        assert_eq!(p.stage, Stage::Applied);
        assert_eq!(p.priority, Priority::High);
        assert_eq!(service.get(p.id).await.unwrap(), p);
        assert_eq!(sink.payloads_of_type("pipeline.created").len(), 1);
    }

    #[tokio::test]
    async fn test_advance_stage_persists_and_emits() {
        let (service, sink) = service();
        let p = service.create(NewPipeline::new("Acme", "SRE"), now()).await.unwrap();
        let later = now() + Duration::days(2);

        let moved = service.advance_stage(p.id, Stage::TechRound1, later).await.unwrap();
        assert_eq!(moved.stage, Stage::TechRound1);
        assert_eq!(moved.updated_at, Some(later));
        assert_eq!(service.get(p.id).await.unwrap().stage, Stage::TechRound1);

        let events = sink.payloads_of_type("pipeline.stage_changed");
        assert_eq!(events.len(), 1);
        let data = &events[0];
        assert_eq!(data["from_stage"], "applied");
        assert_eq!(data["to_stage"], "tech_round_1");
    }

    #[tokio::test]
    async fn test_illegal_advance_writes_nothing() {
        let (service, sink) = service();
        let p = service.create(NewPipeline::new("Acme", "SRE"), now()).await.unwrap();

        let err = service
            .advance_stage(p.id, Stage::Offer, now() + Duration::days(1))
            .await
            .unwrap_err();
        match err {
            TrackerError::Transition(e) => {
                assert_eq!(e.kind, TransitionErrorKind::IllegalTransition);
                assert_eq!(
                    e.allowed,
                    vec![Stage::RecruiterScreen, Stage::TechRound1, Stage::Rejected, Stage::Dropped]
                );
            }
            other => panic!("unexpected error: {other}"),
        }

        let stored = service.get(p.id).await.unwrap();
        assert_eq!(stored.stage, Stage::Applied);
        assert_eq!(stored.updated_at, Some(now()));
        assert_eq!(sink.payloads_of_type("pipeline.transition_rejected").len(), 1);
        assert!(sink.payloads_of_type("pipeline.stage_changed").is_empty());
    }

    #[tokio::test]
    async fn test_advance_missing_pipeline() {
        let (service, _) = service();
        let err = service
            .advance_stage(Uuid::new_v4(), Stage::TechRound1, now())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "Pipeline", .. }));
    }

    #[tokio::test]
    async fn test_record_outcome_stamps_completion() {
        let (service, _) = service();
        let p = service.create(NewPipeline::new("Acme", "SRE"), now()).await.unwrap();
        let interview = service
            .add_interview(
                p.id,
                Interview::new(p.id, Stage::TechRound1).with_scheduled_at(now() + Duration::days(1)),
                now(),
            )
            .await
            .unwrap();

        let later = now() + Duration::days(3);
        let updated = service
            .record_outcome(p.id, interview.id, InterviewOutcome::Passed, later)
            .await
            .unwrap();
        assert_eq!(updated.outcome, InterviewOutcome::Passed);
        assert_eq!(updated.completed_at, Some(later));

        let stored = service.get(p.id).await.unwrap();
        assert_eq!(stored.updated_at, Some(later));
        assert_eq!(stored.interviews[0].outcome, InterviewOutcome::Passed);
    }

    #[tokio::test]
    async fn test_record_outcome_unknown_interview() {
        let (service, _) = service();
        let p = service.create(NewPipeline::new("Acme", "SRE"), now()).await.unwrap();
        let err = service
            .record_outcome(p.id, Uuid::new_v4(), InterviewOutcome::Failed, now())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "Interview", .. }));
    }

    #[tokio::test]
    async fn test_attention_list_and_health() {
        let (service, _) = service();
        let stale = service
            .create(NewPipeline::new("Stale Co", "SRE"), now() - Duration::days(12))
            .await
            .unwrap();
        service.create(NewPipeline::new("Fresh Co", "SRE"), now()).await.unwrap();
        let offer = service
            .create(NewPipeline::new("Offer Co", "SRE"), now() - Duration::days(40))
            .await
            .unwrap();
        for stage in [Stage::TechRound1, Stage::HmRound, Stage::Offer] {
            service
                .advance_stage(offer.id, stage, now() - Duration::days(30))
                .await
                .unwrap();
        }

        assert_eq!(
            service.health(stale.id, now()).await.unwrap().health,
            PipelineHealth::Stale
        );
        assert_eq!(
            service.health(offer.id, now()).await.unwrap().health,
            PipelineHealth::Closed
        );

        let items = service.attention_list(now()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].company, "Stale Co");
    }

    #[tokio::test]
    async fn test_listing_and_distribution() {
        let (service, _) = service();
        let a = service.create(NewPipeline::new("Acme", "SRE"), now()).await.unwrap();
        let b = service
            .create(NewPipeline::new("Globex", "Data Engineer"), now() - Duration::days(1))
            .await
            .unwrap();
        service.advance_stage(b.id, Stage::Rejected, now() - Duration::days(1)).await.unwrap();

        assert_eq!(service.all(false).await.unwrap().len(), 1);
        let all = service.all(true).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);

        assert_eq!(service.active_pipelines().await.unwrap().len(), 1);
        assert_eq!(service.search("data").await.unwrap()[0].id, b.id);

        let dist = service.stage_distribution().await.unwrap();
        assert_eq!(dist.get(&Stage::Applied), Some(&1));
        assert_eq!(dist.get(&Stage::Rejected), Some(&1));

        assert!(service.delete(a.id).await.unwrap());
        assert!(!service.delete(a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_advances_from_same_stage() {
        let service = PipelineService::new(YieldingStore::default());
        let p = service.create(NewPipeline::new("Acme", "SRE"), now()).await.unwrap();
        let later = now() + Duration::hours(1);

        let (rejected, screened) = tokio::join!(
            service.advance_stage(p.id, Stage::Rejected, later),
            service.advance_stage(p.id, Stage::TechRound1, later),
        );

        assert!(rejected.is_ok());
        match screened {
            Err(TrackerError::Transition(e)) => {
                assert_eq!(e.kind, TransitionErrorKind::FromTerminal);
                assert_eq!(e.from, Stage::Rejected);
            }
            other => panic!("expected a rejected move, got {other:?}"),
        }
        assert_eq!(service.get(p.id).await.unwrap().stage, Stage::Rejected);
    }

    #[tokio::test]
    async fn test_concurrent_interview_and_advance_both_persist() {
        let service = PipelineService::new(YieldingStore::default());
        let p = service.create(NewPipeline::new("Acme", "SRE"), now()).await.unwrap();
        let later = now() + Duration::hours(1);

        let (added, moved) = tokio::join!(
            service.add_interview(
                p.id,
                Interview::new(p.id, Stage::RecruiterScreen).with_scheduled_at(now() + Duration::days(2)),
                later,
            ),
            service.advance_stage(p.id, Stage::TechRound1, later),
        );

        let added = added.unwrap();
        moved.unwrap();
        let stored = service.get(p.id).await.unwrap();
        assert_eq!(stored.stage, Stage::TechRound1);
        assert_eq!(stored.interviews.len(), 1);
        assert_eq!(stored.interviews[0].id, added.id);
    }

    #[tokio::test]
    async fn test_prep_and_thank_you_leave_updated_at() {
        let (service, _) = service();
        let p = service.create(NewPipeline::new("Acme", "SRE"), now()).await.unwrap();
        let interview = service
            .add_interview(p.id, Interview::new(p.id, Stage::TechRound1), now())
            .await
            .unwrap();

        let prepped = service
            .update_prep_status(p.id, interview.id, PrepStatus::InProgress, Some(4))
            .await
            .unwrap();
        assert_eq!(prepped.prep_status, PrepStatus::InProgress);
        assert_eq!(prepped.confidence, Some(4));

        let ready = service
            .update_prep_status(p.id, interview.id, PrepStatus::Ready, None)
            .await
            .unwrap();
        assert_eq!(ready.confidence, Some(4));

        let thanked = service.mark_thank_you_sent(p.id, interview.id).await.unwrap();
        assert!(thanked.thank_you_sent);

        let stored = service.get(p.id).await.unwrap();
        assert_eq!(stored.updated_at, Some(now()));
        assert_eq!(stored.interviews[0].prep_status, PrepStatus::Ready);
        assert!(stored.interviews[0].thank_you_sent);

        let err = service.mark_thank_you_sent(p.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "Interview", .. }));
    }

    #[tokio::test]
    async fn test_reminders_over_stored_pipelines() {
        let (service, _) = service();
        let p = service.create(NewPipeline::new("Acme", "SRE"), now()).await.unwrap();
        service
            .add_interview(
                p.id,
                Interview::new(p.id, Stage::RecruiterScreen).with_scheduled_at(now() + Duration::minutes(45)),
                now(),
            )
            .await
            .unwrap();

        let kinds: Vec<ReminderKind> = service
            .reminders(now())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(kinds, vec![ReminderKind::InterviewSoon, ReminderKind::PrepIncomplete]);
    }

    #[tokio::test]
    async fn test_from_config_uses_thresholds() {
        let config = TrackerConfig::new()
            .with_thresholds(HealthThresholds {
                stale_after_days: 3,
                ..HealthThresholds::default()
            })
            .with_log_events(true);
        let service = PipelineService::from_config(InMemoryPipelineStore::new(), &config);
        let p = service
            .create(NewPipeline::new("Acme", "SRE"), now() - Duration::days(4))
            .await
            .unwrap();

        assert_eq!(
            service.health(p.id, now()).await.unwrap().health,
            PipelineHealth::Stale
        );
    }
}
