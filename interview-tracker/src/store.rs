//! Pipeline storage port.
//!
//! The state machine never writes; services persist through a
//! [`PipelineStore`] supplied by the caller.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::Pipeline;
use crate::errors::TrackerError;

/// Storage for pipelines and their interviews.
#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Inserts a new pipeline.
    async fn insert(&self, pipeline: Pipeline) -> Result<(), TrackerError>;

    /// Gets a pipeline by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Pipeline>, TrackerError>;

    /// Replaces an existing pipeline.
    async fn update(&self, pipeline: Pipeline) -> Result<(), TrackerError>;

    /// Applies `f` to a pipeline and persists the result in one step.
    ///
    /// No other write may interleave between reading the record and
    /// committing it. If `f` fails, nothing is written.
    async fn modify<T, F>(&self, id: Uuid, f: F) -> Result<T, TrackerError>
    where
        F: FnOnce(&mut Pipeline) -> Result<T, TrackerError> + Send,
        T: Send;

    /// Removes a pipeline. Returns false if it did not exist.
    async fn remove(&self, id: Uuid) -> Result<bool, TrackerError>;

    /// Lists every pipeline, in no particular order.
    async fn list(&self) -> Result<Vec<Pipeline>, TrackerError>;
}

/// In-memory pipeline store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPipelineStore {
    pipelines: Arc<RwLock<HashMap<Uuid, Pipeline>>>,
}

impl InMemoryPipelineStore {
    /// Creates a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.read().len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.read().is_empty()
    }
}

#[async_trait]
impl PipelineStore for InMemoryPipelineStore {
    async fn insert(&self, pipeline: Pipeline) -> Result<(), TrackerError> {
        let mut pipelines = self.pipelines.write();
        if pipelines.contains_key(&pipeline.id) {
            return Err(TrackerError::Store(format!(
                "pipeline {} already exists",
                pipeline.id
            )));
        }
        pipelines.insert(pipeline.id, pipeline);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Pipeline>, TrackerError> {
        Ok(self.pipelines.read().get(&id).cloned())
    }

    async fn update(&self, pipeline: Pipeline) -> Result<(), TrackerError> {
        let mut pipelines = self.pipelines.write();
        match pipelines.get_mut(&pipeline.id) {
            Some(slot) => {
                *slot = pipeline;
                Ok(())
            }
            None => Err(TrackerError::pipeline_not_found(pipeline.id)),
        }
    }

    async fn modify<T, F>(&self, id: Uuid, f: F) -> Result<T, TrackerError>
    where
        F: FnOnce(&mut Pipeline) -> Result<T, TrackerError> + Send,
        T: Send,
    {
        let mut pipelines = self.pipelines.write();
        let slot = pipelines
            .get_mut(&id)
            .ok_or_else(|| TrackerError::pipeline_not_found(id))?;

        let mut draft = slot.clone();
        let out = f(&mut draft)?;
        *slot = draft;
        Ok(out)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, TrackerError> {
        Ok(self.pipelines.write().remove(&id).is_some())
    }

    async fn list(&self) -> Result<Vec<Pipeline>, TrackerError> {
        Ok(self.pipelines.read().values().cloned().collect())
    }
}
