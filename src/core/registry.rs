use std::collections::BTreeMap;

use crate::core::NodeValue;
use crate::core::error::Error;
use crate::core::function::{FunctionConfig, FunctionLogic, FunctionUnit};
use crate::core::resources::Resources;

type Factory = Box<dyn Fn(NodeValue, &Resources) -> Result<FunctionUnit, Error> + Send + Sync>;

/// Name → factory table for capabilities.
///
/// Populate it once at start-up, then share it (e.g. behind an `Arc`) for concurrent
/// `resolve` calls. Entries are never overwritten or cleared.
pub struct Registry {
    factories: BTreeMap<String, Factory>,
    resources: Resources,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_resources(Resources::default())
    }

    /// Creates a registry whose factories receive `resources` during setup.
    pub fn with_resources(resources: Resources) -> Self {
        Self {
            factories: BTreeMap::new(),
            resources,
        }
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Binds `name` to a setup factory.
    ///
    /// The factory turns a typed configuration plus the shared resources into bound logic.
    /// It runs once per `resolve`, never per invocation.
    pub fn register<C, L, F>(&mut self, name: impl Into<String>, setup: F) -> Result<(), Error>
    where
        C: FunctionConfig,
        L: FunctionLogic,
        F: Fn(C, &Resources) -> Result<L, Error> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::DuplicateCapability(name));
        }

        let capability = name.clone();
        let factory: Factory = Box::new(move |raw: NodeValue, resources: &Resources| {
            let raw = if raw.is_null() {
                NodeValue::Object(Default::default())
            } else {
                raw
            };
            let config: C = serde_json::from_value(raw)
                .map_err(|e| Error::configuration(&capability, e))?;
            config
                .validate()
                .map_err(|reason| Error::configuration(&capability, reason))?;
            let logic = setup(config, resources)?;
            Ok(FunctionUnit::new(capability.clone(), logic))
        });

        log::debug!("Registered capability '{}'", name);
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Runs the setup phase of `name` with `config` and returns the bound unit.
    ///
    /// `null` config means "all defaults".
    pub fn resolve(&self, name: &str, config: NodeValue) -> Result<FunctionUnit, Error> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::UnknownCapability(name.to_string()))?;

        let unit = factory(config, &self.resources)?;
        log::debug!("Resolved capability '{}'", name);
        Ok(unit)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Snapshot of every registered name, sorted.
    pub fn list(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("capabilities", &self.list())
            .field("resources", &self.resources)
            .finish()
    }
}
