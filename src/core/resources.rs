use std::sync::Arc;

use crate::core::error::Error;
use crate::data::EventStore;
use crate::llm::LanguageModel;

/// Collaborator handles handed to factories during setup.
///
/// Functions keep clones of these `Arc`s; they never own the collaborator's lifecycle.
#[derive(Clone, Default)]
pub struct Resources {
    llm: Option<Arc<dyn LanguageModel>>,
    store: Option<Arc<dyn EventStore>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_llm(mut self, llm: Arc<dyn LanguageModel>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn EventStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn llm(&self) -> Option<Arc<dyn LanguageModel>> {
        self.llm.clone()
    }

    pub fn store(&self) -> Option<Arc<dyn EventStore>> {
        self.store.clone()
    }

    /// The language model, or a configuration error naming the capability that needed it.
    pub fn require_llm(&self, capability: &str) -> Result<Arc<dyn LanguageModel>, Error> {
        self.llm()
            .ok_or_else(|| Error::configuration(capability, "no language model collaborator"))
    }

    /// The event store, or a configuration error naming the capability that needed it.
    pub fn require_store(&self, capability: &str) -> Result<Arc<dyn EventStore>, Error> {
        self.store()
            .ok_or_else(|| Error::configuration(capability, "no event store collaborator"))
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("llm", &self.llm.is_some())
            .field("store", &self.store.is_some())
            .finish()
    }
}
