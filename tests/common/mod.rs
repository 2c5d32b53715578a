#![allow(dead_code)]

use async_trait::async_trait;
use planwright::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const THEMES_REPLY: &str = "**1. Smash Bash** - a doubles ladder\n\
                                **2. Net Gains** - charity rally\n\
                                **2. Net Gains** - charity rally\n\
                                **3. Dink Disco** - glow-in-the-dark night games\n";

pub const PLAN_REPLY: &str = "Agenda: 9 AM check-in, 10 AM pools, 4 PM finals.\nInvitation: Join us!";

type Reply = Box<dyn Fn(&str) -> Result<String, LLMError> + Send + Sync>;

/// Deterministic language model that records every prompt it receives.
pub struct StubModel {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn with(reply: impl Fn(&str) -> Result<String, LLMError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &'static str) -> Arc<Self> {
        Self::with(move |_| Ok(text.to_string()))
    }

    pub fn failing(reason: &'static str) -> Arc<Self> {
        Self::with(move |_| Err(LLMError::Provider(reason.to_string())))
    }

    /// Themes for theme prompts, a plan for everything else.
    pub fn planner() -> Arc<Self> {
        Self::with(|prompt| {
            if prompt.starts_with("Generate exactly") {
                Ok(THEMES_REPLY.to_string())
            } else {
                Ok(PLAN_REPLY.to_string())
            }
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, prompt: &str, _model: Option<String>) -> Result<String, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)(prompt)
    }
}

pub fn planning_registry(llm: Arc<StubModel>) -> Registry {
    let resources = Resources::new()
        .with_llm(llm)
        .with_store(Arc::new(InMemoryStore::with_sample_data()));
    let mut registry = Registry::with_resources(resources);
    register_event_planning(&mut registry).unwrap();
    registry
}

pub fn logistics(start_date: &str, end_date: &str) -> EventLogistics {
    EventLogistics {
        start_date: start_date.into(),
        end_date: end_date.into(),
        start_time: "9 AM".into(),
        end_time: "5 PM".into(),
        location: "Hyderabad Sports Arena".into(),
        event_type: "tournament".into(),
    }
}
