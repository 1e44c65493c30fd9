//! The FilterPipeline orchestrates multiple filter stages.
//!
//! This module provides the main FilterPipeline struct that chains
//! optional stages together using the builder pattern.

use crate::error::{PipelineError, Result};
use crate::request::RequestParams;
use crate::traits::FilterStage;
use records::Query;

/// Chains optional filter stages into a single query transformation.
///
/// Built once per resource type and then shared read-only; `run` takes the
/// request explicitly, so one pipeline can serve any number of requests.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_stage(Search::new("name"))?
///     .add_stage(ExactMatch::new("role"))?
///     .add_stage(NumericRange::new("age"))?;
///
/// let query = pipeline.run(&request, Query::for_record::<User>())?;
/// ```
pub struct FilterPipeline {
    stages: Vec<Box<dyn FilterStage>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Add a stage to the end of the pipeline (builder pattern).
    ///
    /// # Returns
    /// * `Ok(Self)` for method chaining
    /// * `Err(DuplicateFilterDefinition)` if a stage with the same trigger
    ///   key is already registered
    pub fn add_stage(mut self, stage: impl FilterStage + 'static) -> Result<Self> {
        self.push(Box::new(stage))?;
        Ok(self)
    }

    /// Build a pipeline from already boxed stages, in registration order.
    pub fn from_stages(stages: Vec<Box<dyn FilterStage>>) -> Result<Self> {
        let mut pipeline = Self::new();
        for stage in stages {
            pipeline.push(stage)?;
        }
        Ok(pipeline)
    }

    fn push(&mut self, stage: Box<dyn FilterStage>) -> Result<()> {
        let key = stage.trigger_key();
        if self.stages.iter().any(|s| s.trigger_key() == key) {
            return Err(PipelineError::DuplicateFilterDefinition(key.to_string()));
        }
        self.stages.push(stage);
        Ok(())
    }

    /// Trigger keys in registration order
    pub fn trigger_keys(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.trigger_key()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Compose every active stage onto `initial`.
    ///
    /// ## Algorithm
    /// Each registered stage behaves like a link in a chain: when its trigger
    /// key is present it first lets the rest of the chain build the query,
    /// then appends its own constraint to the result. Unrolled, that is a
    /// right-to-left fold:
    /// 1. Walk the stages from last registered to first
    /// 2. Skip stages whose trigger key is absent from `request`
    /// 3. Otherwise apply the stage to the query built so far
    ///
    /// Active stages therefore contribute their constraints in reverse
    /// registration order. For pure narrowing constraints the result set is
    /// the same either way, but `Sort` and `Limit` stages observe it.
    ///
    /// # Returns
    /// * `Ok(Query)` - `initial` with every active stage's constraint added;
    ///   `initial` itself when no stage is active
    /// * `Err` - the first stage failure; nothing partial is returned
    pub fn run(&self, request: &RequestParams, initial: Query) -> Result<Query> {
        self.stages.iter().rev().try_fold(initial, |query, stage| {
            let key = stage.trigger_key();
            if !request.has(key) {
                tracing::trace!("Skipping filter: {} (parameter absent)", key);
                return Ok(query);
            }

            tracing::debug!(
                "Applying filter: {} (constraints so far: {})",
                key,
                query.constraints().len()
            );
            stage.apply(query, request).inspect_err(|err| {
                tracing::warn!("Filter {} rejected request: {}", key, err);
            })
        })
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
