use serde::Serialize;
use std::collections::HashMap;

use crate::core::NodeValue;
use crate::core::error::Error;

/// Reserved path root addressing the run's original input.
pub const INPUT_KEY: &str = "$input";

/// Per-run store threading values between workflow steps.
///
/// Holds the run's original input plus every published step output.
/// Entries are append-only: a key can be published once per run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowContext {
    input: NodeValue,
    entries: HashMap<String, NodeValue>,
    order: Vec<String>,
}

impl WorkflowContext {
    pub fn new(input: NodeValue) -> Self {
        Self {
            input,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The value the run was started with.
    pub fn input(&self) -> &NodeValue {
        &self.input
    }

    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Resolves a dotted path such as `"moderators.records"` or `"themes.themes.0"`.
    ///
    /// The first segment names a published key, or [`INPUT_KEY`] for the run input.
    /// Later segments walk object fields and array indices.
    pub fn lookup(&self, path: &str) -> Result<&NodeValue, Error> {
        let mut segments = path.split('.');
        let key = segments.next().unwrap_or_default();
        let mut value = if key == INPUT_KEY {
            &self.input
        } else {
            self.entries
                .get(key)
                .ok_or_else(|| Error::MissingContextKey(key.to_string()))?
        };
        for segment in segments {
            let next = match value {
                NodeValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                other => other.get(segment),
            };
            value = next.ok_or_else(|| Error::MissingContextKey(path.to_string()))?;
        }
        Ok(value)
    }

    pub fn publish(&mut self, key: impl Into<String>, value: NodeValue) -> Result<(), Error> {
        let key = key.into();
        if key.contains('.') {
            return Err(Error::InvalidContextKey(key));
        }
        if key == INPUT_KEY || self.entries.contains_key(&key) {
            return Err(Error::ContextKeyExists(key));
        }
        self.order.push(key.clone());
        self.entries.insert(key, value);
        Ok(())
    }

    /// Published keys in publication order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The most recently published value, if any.
    pub fn last(&self) -> Option<&NodeValue> {
        self.order.last().and_then(|k| self.entries.get(k))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consumes the context, returning published entries in publication order.
    pub fn into_entries(mut self) -> Vec<(String, NodeValue)> {
        self.order
            .into_iter()
            .filter_map(|k| self.entries.remove(&k).map(|v| (k, v)))
            .collect()
    }
}
