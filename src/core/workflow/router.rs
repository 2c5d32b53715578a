use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::NodeValue;
use crate::core::error::Error;
use crate::core::registry::Registry;
use crate::core::telemetry::Telemetry;
use crate::core::validation::ValidationResult;
use crate::core::workflow::{BoundStep, Run, Step, WorkflowError, WorkflowOutcome};

/// Label used for failures of the routing decision itself.
const ROUTER: &str = "router";

/// Where a router takes its decision from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSelector {
    /// A string field of the run's input object.
    /// The field is removed from the input the selected branch sees.
    Field(String),
    /// A classifier step run before any branch. Its output, or the named field of it,
    /// must be a string naming a branch.
    Classifier {
        step: Step,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decision_field: Option<String>,
    },
}

#[derive(Clone)]
enum Selector {
    Field(String),
    Classifier {
        step: BoundStep,
        decision_field: Option<String>,
    },
}

/// Runs exactly one of several named branches per run.
///
/// Branches that are not selected are never invoked. A decision naming no branch
/// fails the run with [`Error::Routing`] before any branch runs.
#[derive(Clone)]
pub struct Router {
    selector: Selector,
    branches: BTreeMap<String, BoundStep>,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl Router {
    pub fn build(
        registry: &Registry,
        selector: RouteSelector,
        branches: BTreeMap<String, Step>,
    ) -> Result<Self, Error> {
        let selector = match selector {
            RouteSelector::Field(field) => Selector::Field(field),
            RouteSelector::Classifier {
                step,
                decision_field,
            } => Selector::Classifier {
                step: BoundStep::resolve(registry, step)?,
                decision_field,
            },
        };
        let branches = branches
            .into_iter()
            .map(|(label, step)| BoundStep::resolve(registry, step).map(|b| (label, b)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            selector,
            branches,
            telemetry: None,
        })
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Branch labels, sorted.
    pub fn branches(&self) -> Vec<String> {
        self.branches.keys().cloned().collect()
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if self.branches.is_empty() {
            result.add_error("Router has no branches; every decision would be unmatched.");
        } else if self.branches.len() == 1 {
            result.add_warning("Router has a single branch; a pipeline would do.");
        }

        let mut published: Vec<&str> = Vec::new();
        if let Selector::Classifier { step, .. } = &self.selector {
            step.validate(&published, &mut result);
            published.push(step.step.output_key.as_str());
        }
        // Branches are exclusive, so each sees only what the classifier published.
        for bound in self.branches.values() {
            bound.validate(&published, &mut result);
        }
        result
    }

    pub async fn run(&self, input: NodeValue) -> Result<WorkflowOutcome, WorkflowError> {
        match &self.selector {
            Selector::Field(field) => {
                let mut input = input;
                let decision = input
                    .as_object_mut()
                    .and_then(|object| object.remove(field))
                    .unwrap_or(NodeValue::Null);
                let mut run = Run::start(input, self.telemetry.as_deref());
                self.dispatch(&mut run, 0, &decision).await?;
                Ok(run.complete())
            }
            Selector::Classifier {
                step,
                decision_field,
            } => {
                let mut run = Run::start(input, self.telemetry.as_deref());
                let output = run.execute(0, step).await?;
                let decision = match decision_field {
                    Some(field) => output.get(field).cloned().unwrap_or(NodeValue::Null),
                    None => output,
                };
                self.dispatch(&mut run, 1, &decision).await?;
                Ok(run.complete())
            }
        }
    }

    async fn dispatch(
        &self,
        run: &mut Run<'_>,
        index: usize,
        decision: &NodeValue,
    ) -> Result<NodeValue, WorkflowError> {
        let selected = decision.as_str().and_then(|label| self.branches.get(label));
        let Some(branch) = selected else {
            let decision = match decision.as_str() {
                Some(label) => label.to_string(),
                None => decision.to_string(),
            };
            log::warn!(
                "No branch matches routing decision '{}' (context holds {} value(s))",
                decision,
                run.context().len()
            );
            return Err(run.fail(
                index,
                ROUTER,
                Error::Routing {
                    decision,
                    branches: self.branches(),
                },
            ));
        };
        run.execute(index, branch).await
    }
}
