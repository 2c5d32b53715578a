use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::core::NodeValue;

/// A single step invocation recorded during a workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub timestamp: u64,
    pub run_id: String,
    pub step: usize,
    pub capability: String,
    pub schema_hash: String,
    pub inputs: NodeValue,
    pub outputs: Option<NodeValue>,
    pub error: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Trait for recording execution traces.
pub trait Telemetry: Send + Sync {
    fn record(&self, entry: TraceEntry);
    fn flush(&self);
}

/// Simple in-memory collector for traces.
#[derive(Default)]
pub struct MemoryTelemetry {
    traces: Mutex<Vec<TraceEntry>>,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_traces(&self) -> Vec<TraceEntry> {
        self.traces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Telemetry for MemoryTelemetry {
    fn record(&self, entry: TraceEntry) {
        self.traces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    fn flush(&self) {
        // No-op for memory collector
    }
}

pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
