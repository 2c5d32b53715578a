//! Function registration and workflow composition.
//!
//! - [`schema`]: input/output contracts
//! - [`function`]: the two-phase function unit (setup once, invoke many)
//! - [`registry`]: capability name → setup factory
//! - [`workflow`]: sequential pipelines and routers over a per-run [`context`]

pub mod context;
pub mod error;
pub mod function;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod telemetry;
pub mod validation;
pub mod workflow;

/// The Alias for serde_json::Value since it is used everywhere
pub type NodeValue = serde_json::Value;
