use std::sync::Arc;

use crate::core::NodeValue;
use crate::core::error::Error;
use crate::core::registry::Registry;
use crate::core::telemetry::Telemetry;
use crate::core::validation::ValidationResult;
use crate::core::workflow::{BoundStep, Run, Step, WorkflowError, WorkflowOutcome};

/// An ordered list of steps executed one after another.
///
/// The first failing step aborts the run. Values published by earlier steps stay
/// in the [`WorkflowError`]'s context; nothing is rolled back.
#[derive(Clone)]
pub struct Pipeline {
    steps: Vec<BoundStep>,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl Pipeline {
    /// Resolves every step's capability against `registry`.
    pub fn build(registry: &Registry, steps: Vec<Step>) -> Result<Self, Error> {
        let steps = steps
            .into_iter()
            .map(|step| BoundStep::resolve(registry, step))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            steps,
            telemetry: None,
        })
    }

    /// Records one trace entry per step invocation into `telemetry`.
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().map(|b| &b.step)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Validates the data flow of the pipeline without running it.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if self.steps.is_empty() {
            result.add_warning("Pipeline has no steps; runs complete with a null output.");
        }

        let mut published: Vec<&str> = Vec::new();
        for bound in &self.steps {
            bound.validate(&published, &mut result);
            published.push(bound.step.output_key.as_str());
        }
        result
    }

    pub async fn run(&self, input: NodeValue) -> Result<WorkflowOutcome, WorkflowError> {
        let mut run = Run::start(input, self.telemetry.as_deref());
        for (index, bound) in self.steps.iter().enumerate() {
            run.execute(index, bound).await?;
        }
        Ok(run.complete())
    }
}
