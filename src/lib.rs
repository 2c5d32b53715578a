//! # Planwright
//!
//! Schema-validated capability registration and workflow composition for
//! LLM-backed event planning.
//!
//! ## Features
//!
//! - **Two-Phase Functions**: configuration is validated once at resolve, then a unit is invoked any number of times
//! - **Contracts Both Ways**: every input and every output is checked against a declared schema
//! - **Explicit Registry**: no hidden global table; capabilities are resolved by name from a registry you own
//! - **Sequential & Routed Workflows**: fail-fast pipelines and single-branch routers over a per-run context
//! - **Optional LLM Client**: an OpenAI-compatible NIM client behind the `llm` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use planwright::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let resources = Resources::new().with_store(Arc::new(InMemoryStore::with_sample_data()));
//! let mut registry = Registry::with_resources(resources);
//! register_event_planning(&mut registry)?;
//!
//! let moderators = registry.resolve("fetch_moderators", NodeValue::Null)?;
//! let found = moderators
//!     .invoke(json!({"names": ["Jai Kumar", "Nonexistent"]}))
//!     .await?;
//! assert_eq!(found["count"], 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`core`](crate::core): function units, the registry and workflow composition
//! - [`planning`]: the event-planning capabilities and a prebuilt planning pipeline
//! - [`data`]: moderator and participant records behind [`data::EventStore`]
//! - [`llm`]: the [`llm::LanguageModel`] collaborator
//! - [`config`]: environment-driven settings
//! - [`prelude`]: commonly used types (import with `use planwright::prelude::*`)

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod core;
pub mod data;
pub mod llm;
pub mod planning;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

pub use crate::config::Settings;
pub use crate::core::NodeValue;
pub use crate::core::context::WorkflowContext;
pub use crate::core::error::{CollaboratorError, Error, Phase};
pub use crate::core::function::{FunctionConfig, FunctionLogic, FunctionUnit};
pub use crate::core::registry::Registry;
pub use crate::core::resources::Resources;
pub use crate::core::schema::{Field, FieldKind, Schema};
pub use crate::core::telemetry::{MemoryTelemetry, Telemetry, TraceEntry};
pub use crate::core::validation::{ValidationIssue, ValidationResult};
pub use crate::core::workflow::{
    Pipeline, RouteSelector, Router, RunState, Step, Workflow, WorkflowError, WorkflowOutcome,
    WorkflowSpec,
};
pub use crate::data::{DataError, EventStore, InMemoryStore, ModeratorRecord, ParticipantRecord};
pub use crate::llm::{LLMError, LanguageModel};
pub use crate::planning::{EventLogistics, PlanningRequest, event_planning_pipeline, register_event_planning};

#[cfg(feature = "llm")]
pub use crate::llm::{NimClient, NimConfig};

// ============================================================================
// Prelude Module - Convenient Bulk Imports
// ============================================================================

/// The main prelude: everything needed to register capabilities and run workflows.
///
/// # Example
/// ```rust
/// use planwright::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        CollaboratorError,
        // Collaborators
        EventStore,
        // Errors
        Error,
        // Planning
        EventLogistics,
        FieldKind,
        FunctionConfig,
        // Functions
        FunctionLogic,
        FunctionUnit,
        InMemoryStore,
        LLMError,
        LanguageModel,
        MemoryTelemetry,
        NodeValue,
        Phase,
        PlanningRequest,
        Registry,
        Resources,
        RouteSelector,
        Schema,
        Settings,
        // Workflows
        Step,
        Telemetry,
        Workflow,
        WorkflowError,
        WorkflowOutcome,
        WorkflowSpec,
        event_planning_pipeline,
        register_event_planning,
    };
}

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
