//! Composition of function units into workflows.
//!
//! - [`Pipeline`]: an ordered list of steps, failing fast
//! - [`Router`]: named branches, exactly one of which runs per run
//!
//! Both run their steps strictly one at a time over a fresh [`WorkflowContext`].
//! A run can be abandoned at any step boundary by dropping its future; no retries
//! happen here.

pub mod router;
pub mod sequential;

pub use router::{RouteSelector, Router};
pub use sequential::Pipeline;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::core::NodeValue;
use crate::core::context::{INPUT_KEY, WorkflowContext};
use crate::core::error::{Error, Phase};
use crate::core::function::FunctionUnit;
use crate::core::registry::Registry;
use crate::core::telemetry::{Telemetry, TraceEntry, now_secs};
use crate::core::validation::ValidationResult;

/// Declaration of one workflow step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Registered capability this step invokes.
    pub capability: String,
    /// Configuration handed to the capability's setup phase.
    #[serde(default, skip_serializing_if = "NodeValue::is_null")]
    pub config: NodeValue,
    /// Context key holding this step's input. `None` means the run's original input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_key: Option<String>,
    /// Context key this step's result is published under.
    pub output_key: String,
    /// Input fields filled from context paths (see [`WorkflowContext::lookup`]).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: BTreeMap<String, String>,
}

impl Step {
    pub fn new(capability: impl Into<String>, output_key: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            config: NodeValue::Null,
            input_key: None,
            output_key: output_key.into(),
            bindings: BTreeMap::new(),
        }
    }

    pub fn input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = Some(key.into());
        self
    }

    pub fn config(mut self, config: NodeValue) -> Self {
        self.config = config;
        self
    }

    /// Sets input field `field` from the context path `source` before invocation.
    pub fn bind(mut self, field: impl Into<String>, source: impl Into<String>) -> Self {
        let field = field.into();
        if self.bindings.contains_key(&field) {
            log::warn!("Binding for field '{}' was already set, overwriting.", field);
        }
        self.bindings.insert(field, source.into());
        self
    }
}

/// A step whose capability has been resolved.
#[derive(Debug, Clone)]
pub(crate) struct BoundStep {
    pub(crate) step: Step,
    pub(crate) unit: FunctionUnit,
}

impl BoundStep {
    pub(crate) fn resolve(registry: &Registry, step: Step) -> Result<Self, Error> {
        let unit = registry.resolve(&step.capability, step.config.clone())?;
        Ok(Self { step, unit })
    }

    fn assemble_input(&self, context: &WorkflowContext) -> Result<NodeValue, Error> {
        let mut input = match &self.step.input_key {
            Some(key) => context.lookup(key)?.clone(),
            None => context.input().clone(),
        };

        if self.step.bindings.is_empty() {
            return Ok(input);
        }

        if input.is_null() {
            input = NodeValue::Object(Default::default());
        }
        let Some(object) = input.as_object_mut() else {
            return Err(Error::validation(
                &self.step.capability,
                Phase::Input,
                "bindings require an object input",
            ));
        };
        for (field, source) in &self.step.bindings {
            object.insert(field.clone(), context.lookup(source)?.clone());
        }
        Ok(input)
    }

    /// Static checks against the keys published before this step.
    fn validate(&self, published: &[&str], result: &mut ValidationResult) {
        let step = &self.step;
        let is_published = |path: &str| {
            let key = path.split_once('.').map_or(path, |(key, _)| key);
            key == INPUT_KEY || published.contains(&key)
        };

        if let Some(key) = &step.input_key {
            if !is_published(key) {
                result.add_error(format!(
                    "Step '{}' reads input key '{}' which no earlier step publishes.",
                    step.capability, key
                ));
            }
        }

        for (field, source) in &step.bindings {
            if !is_published(source) {
                result.add_error(format!(
                    "Step '{}' binds '{}' from '{}' which no earlier step publishes.",
                    step.capability, field, source
                ));
            }
            if self.unit.input_schema().field(field).is_none() {
                result.add_error(format!(
                    "Step '{}' binds '{}' which its input schema does not declare.",
                    step.capability, field
                ));
            }
        }

        if step.output_key.contains('.') {
            result.add_error(format!(
                "Step '{}' publishes '{}', a key containing '.' that no path can reach.",
                step.capability, step.output_key
            ));
        }

        if published.contains(&step.output_key.as_str()) {
            result.add_error(format!(
                "Step '{}' publishes '{}' which an earlier step already published.",
                step.capability, step.output_key
            ));
        }
    }
}

/// Lifecycle of a single workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Running { step: usize, capability: String },
    Completed,
    Failed { step: usize, capability: String },
}

/// A finished, successful run.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub run_id: Uuid,
    /// The value published by the last executed step (`null` for an empty workflow).
    pub output: NodeValue,
    pub context: WorkflowContext,
    pub history: Vec<RunState>,
}

/// A failed run, with everything published before the failure.
#[derive(Debug, Error)]
#[error("workflow run {run_id} failed at step {step} ('{capability}'): {cause}")]
pub struct WorkflowError {
    pub run_id: Uuid,
    pub step: usize,
    /// Capability of the failing step, or `router` for a routing decision.
    pub capability: String,
    #[source]
    pub cause: Error,
    pub context: WorkflowContext,
    pub history: Vec<RunState>,
}

/// Mutable bookkeeping of one run. Never shared between runs.
pub(crate) struct Run<'a> {
    run_id: Uuid,
    context: WorkflowContext,
    history: Vec<RunState>,
    telemetry: Option<&'a dyn Telemetry>,
}

impl<'a> Run<'a> {
    pub(crate) fn start(input: NodeValue, telemetry: Option<&'a dyn Telemetry>) -> Self {
        let run_id = Uuid::new_v4();
        log::debug!("Workflow run {} pending", run_id);
        Self {
            run_id,
            context: WorkflowContext::new(input),
            history: vec![RunState::Pending],
            telemetry,
        }
    }

    fn transition(&mut self, state: RunState) {
        log::debug!("Workflow run {} -> {:?}", self.run_id, state);
        self.history.push(state);
    }

    /// Runs one bound step and publishes its result.
    pub(crate) async fn execute(
        &mut self,
        index: usize,
        bound: &BoundStep,
    ) -> Result<NodeValue, WorkflowError> {
        let capability = bound.step.capability.clone();
        self.transition(RunState::Running {
            step: index,
            capability: capability.clone(),
        });

        let input = match bound.assemble_input(&self.context) {
            Ok(input) => input,
            Err(e) => return Err(self.fail(index, &capability, e)),
        };

        let result = bound.unit.invoke(input.clone()).await;
        self.trace(index, bound, input, &result);

        let output = match result {
            Ok(output) => output,
            Err(e) => return Err(self.fail(index, &capability, e)),
        };

        if let Err(e) = self
            .context
            .publish(bound.step.output_key.clone(), output.clone())
        {
            return Err(self.fail(index, &capability, e));
        }
        Ok(output)
    }

    fn trace(
        &self,
        index: usize,
        bound: &BoundStep,
        inputs: NodeValue,
        result: &Result<NodeValue, Error>,
    ) {
        let Some(telemetry) = self.telemetry else {
            return;
        };
        let (outputs, error) = match result {
            Ok(v) => (Some(v.clone()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        telemetry.record(TraceEntry {
            timestamp: now_secs(),
            run_id: self.run_id.to_string(),
            step: index,
            capability: bound.step.capability.clone(),
            schema_hash: bound.unit.input_schema().structural_hash(),
            inputs,
            outputs,
            error,
            metadata: Default::default(),
        });
    }

    pub(crate) fn context(&self) -> &WorkflowContext {
        &self.context
    }

    pub(crate) fn fail(&mut self, step: usize, capability: &str, cause: Error) -> WorkflowError {
        self.transition(RunState::Failed {
            step,
            capability: capability.to_string(),
        });
        if let Some(t) = self.telemetry {
            t.flush();
        }
        log::warn!(
            "Workflow run {} failed at step {} ('{}'): {}",
            self.run_id,
            step,
            capability,
            cause
        );
        WorkflowError {
            run_id: self.run_id,
            step,
            capability: capability.to_string(),
            cause,
            context: std::mem::take(&mut self.context),
            history: std::mem::take(&mut self.history),
        }
    }

    pub(crate) fn complete(mut self) -> WorkflowOutcome {
        self.transition(RunState::Completed);
        if let Some(t) = self.telemetry {
            t.flush();
        }
        log::info!(
            "Workflow run {} completed with {} published value(s)",
            self.run_id,
            self.context.len()
        );
        WorkflowOutcome {
            run_id: self.run_id,
            output: self.context.last().cloned().unwrap_or(NodeValue::Null),
            context: self.context,
            history: self.history,
        }
    }
}

/// Host-facing declaration of a workflow, loadable from any serde source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowSpec {
    Sequential {
        steps: Vec<Step>,
    },
    Router {
        selector: RouteSelector,
        branches: BTreeMap<String, Step>,
    },
}

impl WorkflowSpec {
    /// Resolves every referenced capability, running each setup phase once.
    pub fn build(self, registry: &Registry) -> Result<Workflow, Error> {
        match self {
            WorkflowSpec::Sequential { steps } => {
                Pipeline::build(registry, steps).map(Workflow::Sequential)
            }
            WorkflowSpec::Router { selector, branches } => {
                Router::build(registry, selector, branches).map(Workflow::Router)
            }
        }
    }
}

/// A built workflow of either form.
pub enum Workflow {
    Sequential(Pipeline),
    Router(Router),
}

impl Workflow {
    pub fn with_telemetry(self, telemetry: Arc<dyn Telemetry>) -> Self {
        match self {
            Workflow::Sequential(p) => Workflow::Sequential(p.with_telemetry(telemetry)),
            Workflow::Router(r) => Workflow::Router(r.with_telemetry(telemetry)),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        match self {
            Workflow::Sequential(p) => p.validate(),
            Workflow::Router(r) => r.validate(),
        }
    }

    pub async fn run(&self, input: NodeValue) -> Result<WorkflowOutcome, WorkflowError> {
        match self {
            Workflow::Sequential(p) => p.run(input).await,
            Workflow::Router(r) => r.run(input).await,
        }
    }
}
