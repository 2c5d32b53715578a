use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::core::NodeValue;
use crate::core::error::{CollaboratorError, Error, Phase};
use crate::core::schema::Schema;

/// Longest input summary attached to collaborator errors.
const INPUT_SUMMARY_LEN: usize = 120;

/// Typed configuration of a capability.
///
/// Deserialized from the JSON handed to [`Registry::resolve`](crate::core::registry::Registry::resolve),
/// so unknown or missing fields fail there. `validate` runs right after, still at setup time.
pub trait FunctionConfig: DeserializeOwned + Send + 'static {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// The invocation phase of a capability.
///
/// Implementors are produced once by a setup factory and then called many times,
/// possibly concurrently, so `call` must not rely on call-scoped mutable state.
#[async_trait]
pub trait FunctionLogic: Send + Sync + 'static {
    type Input: DeserializeOwned + Send + 'static;
    type Output: Serialize + Send + 'static;

    /// Human-readable description surfaced to the hosting runtime.
    fn description(&self) -> &str;

    fn input_schema(&self) -> Schema;

    fn output_schema(&self) -> Schema;

    /// Delegates to the collaborator. Only reached with input that passed the input schema.
    async fn call(&self, input: Self::Input) -> Result<Self::Output, CollaboratorError>;
}

/// Object-safe view over any `FunctionLogic`, working on JSON values.
trait ErasedLogic: Send + Sync {
    fn invoke<'a>(
        &'a self,
        capability: &'a str,
        input: NodeValue,
    ) -> BoxFuture<'a, Result<NodeValue, Error>>;
}

impl<L: FunctionLogic> ErasedLogic for L {
    fn invoke<'a>(
        &'a self,
        capability: &'a str,
        input: NodeValue,
    ) -> BoxFuture<'a, Result<NodeValue, Error>> {
        Box::pin(async move {
            let input_summary = summarize(&input);
            let typed: L::Input = serde_json::from_value(input)
                .map_err(|e| Error::validation(capability, Phase::Input, e))?;

            let output = self
                .call(typed)
                .await
                .map_err(|source| Error::Collaborator {
                    capability: capability.to_string(),
                    input_summary,
                    source,
                })?;

            serde_json::to_value(output).map_err(|e| Error::validation(capability, Phase::Output, e))
        })
    }
}

struct UnitInner {
    name: String,
    description: String,
    input_schema: Schema,
    output_schema: Schema,
    logic: Box<dyn ErasedLogic>,
}

/// A set-up, schema-bound capability ready to be invoked.
///
/// Cloning is cheap and clones share the same bound state, so one unit can serve
/// many concurrent invocations.
#[derive(Clone)]
pub struct FunctionUnit {
    inner: Arc<UnitInner>,
}

impl FunctionUnit {
    /// Binds already set-up logic under a capability name.
    pub fn new<L: FunctionLogic>(name: impl Into<String>, logic: L) -> Self {
        let inner = UnitInner {
            name: name.into(),
            description: logic.description().to_string(),
            input_schema: logic.input_schema(),
            output_schema: logic.output_schema(),
            logic: Box::new(logic),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn description(&self) -> &str {
        &self.inner.description
    }

    pub fn input_schema(&self) -> &Schema {
        &self.inner.input_schema
    }

    pub fn output_schema(&self) -> &Schema {
        &self.inner.output_schema
    }

    /// Validates `input`, delegates, then validates the result.
    ///
    /// Invalid input never reaches the collaborator. A result that breaks the output
    /// schema is reported as an output-phase validation error.
    pub async fn invoke(&self, input: NodeValue) -> Result<NodeValue, Error> {
        let name = self.name();

        self.inner
            .input_schema
            .validate(&input)
            .map_err(|reason| Error::validation(name, Phase::Input, reason))?;

        let output = match self.inner.logic.invoke(name, input).await {
            Ok(output) => output,
            Err(e) => {
                log::warn!("Capability '{}' failed: {}", name, e);
                return Err(e);
            }
        };

        if let Err(reason) = self.inner.output_schema.validate(&output) {
            log::warn!("Capability '{}' broke its output contract: {}", name, reason);
            return Err(Error::validation(name, Phase::Output, reason));
        }

        Ok(output)
    }
}

impl std::fmt::Debug for FunctionUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionUnit")
            .field("name", &self.inner.name)
            .field("input_schema", &self.inner.input_schema)
            .field("output_schema", &self.inner.output_schema)
            .finish()
    }
}

/// Compact, single-line rendering of an input for error context.
pub(crate) fn summarize(value: &NodeValue) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= INPUT_SUMMARY_LEN {
        return rendered;
    }
    let mut cut: String = rendered.chars().take(INPUT_SUMMARY_LEN).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct ShoutInput {
        text: String,
    }

    #[derive(Serialize)]
    struct ShoutOutput {
        text: String,
    }

    struct ShoutLogic {
        calls: Arc<AtomicUsize>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl FunctionLogic for ShoutLogic {
        type Input = ShoutInput;
        type Output = ShoutOutput;

        fn description(&self) -> &str {
            "Upper-cases text"
        }

        fn input_schema(&self) -> Schema {
            "text: string".parse().unwrap()
        }

        fn output_schema(&self) -> Schema {
            "text: string".parse().unwrap()
        }

        async fn call(&self, input: ShoutInput) -> Result<ShoutOutput, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.as_deref() == Some(input.text.as_str()) {
                return Err(CollaboratorError::other("upstream unavailable"));
            }
            Ok(ShoutOutput {
                text: input.text.to_uppercase(),
            })
        }
    }

    /// Declares a string output but produces an integer.
    struct LyingLogic;

    #[async_trait]
    impl FunctionLogic for LyingLogic {
        type Input = NodeValue;
        type Output = NodeValue;

        fn description(&self) -> &str {
            "Breaks its contract"
        }

        fn input_schema(&self) -> Schema {
            Schema::new()
        }

        fn output_schema(&self) -> Schema {
            "answer: string".parse().unwrap()
        }

        async fn call(&self, _input: NodeValue) -> Result<NodeValue, CollaboratorError> {
            Ok(json!({"answer": 42}))
        }
    }

    fn shout(fail_on: Option<&str>) -> (FunctionUnit, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let unit = FunctionUnit::new(
            "shout",
            ShoutLogic {
                calls: calls.clone(),
                fail_on: fail_on.map(str::to_string),
            },
        );
        (unit, calls)
    }

    #[tokio::test]
    async fn test_invoke_happy_path() {
        let (unit, calls) = shout(None);
        let out = unit.invoke(json!({"text": "hi"})).await.unwrap();
        assert_eq!(out, json!({"text": "HI"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(unit.description(), "Upper-cases text");
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_logic() {
        let (unit, calls) = shout(None);

        let missing = unit.invoke(json!({})).await.unwrap_err();
        let unknown = unit.invoke(json!({"text": "a", "tone": "loud"})).await.unwrap_err();
        let wrong_type = unit.invoke(json!({"text": 3})).await.unwrap_err();

        for err in [missing, unknown, wrong_type] {
            assert!(matches!(
                err,
                Error::Validation {
                    phase: Phase::Input,
                    ..
                }
            ));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_collaborator_failure_is_wrapped_and_unit_stays_usable() {
        let (unit, calls) = shout(Some("boom"));

        let err = unit.invoke(json!({"text": "boom"})).await.unwrap_err();
        match &err {
            Error::Collaborator {
                capability,
                input_summary,
                ..
            } => {
                assert_eq!(capability, "shout");
                assert!(input_summary.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let out = unit.invoke(json!({"text": "ok"})).await.unwrap();
        assert_eq!(out, json!({"text": "OK"}));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_output_contract_violation() {
        let unit = FunctionUnit::new("liar", LyingLogic);
        let err = unit.invoke(json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                phase: Phase::Output,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_clones_share_bound_state() {
        let (unit, calls) = shout(None);
        let other = unit.clone();
        let (a, b) = futures::join!(
            unit.invoke(json!({"text": "a"})),
            other.invoke(json!({"text": "b"}))
        );
        assert_eq!(a.unwrap(), json!({"text": "A"}));
        assert_eq!(b.unwrap(), json!({"text": "B"}));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_summarize_truncates_long_inputs() {
        let long = json!({"text": "x".repeat(500)});
        let summary = summarize(&long);
        assert_eq!(summary.chars().count(), INPUT_SUMMARY_LEN + 1);
        assert!(summary.ends_with('…'));
        assert_eq!(summarize(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
