use std::fmt;

use thiserror::Error;

use crate::data::DataError;
use crate::llm::LLMError;

/// Which side of a function contract a validation failure was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Output,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Input => f.write_str("input"),
            Phase::Output => f.write_str("output"),
        }
    }
}

/// Failure raised by an external dependency a function delegates to.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error(transparent)]
    Llm(#[from] LLMError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl CollaboratorError {
    /// Wraps a failure from a host-provided collaborator.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        CollaboratorError::Other(err.into())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Setup-time failure. The unit never became usable.
    #[error("configuration error for '{capability}': {reason}")]
    Configuration { capability: String, reason: String },

    /// A value did not match the declared schema. The unit stays usable.
    #[error("{phase} validation failed for '{capability}': {reason}")]
    Validation {
        capability: String,
        phase: Phase,
        reason: String,
    },

    #[error("collaborator failed in '{capability}' (input: {input_summary}): {source}")]
    Collaborator {
        capability: String,
        input_summary: String,
        #[source]
        source: CollaboratorError,
    },

    #[error("capability '{0}' is already registered")]
    DuplicateCapability(String),

    #[error("capability '{0}' is not registered")]
    UnknownCapability(String),

    #[error("no branch matches routing decision '{decision}' (branches: {})", branches.join(", "))]
    Routing {
        decision: String,
        branches: Vec<String>,
    },

    #[error("context key '{0}' was never published")]
    MissingContextKey(String),

    #[error("context key '{0}' is already published")]
    ContextKeyExists(String),

    #[error("context key '{0}' contains '.' and could never be looked up")]
    InvalidContextKey(String),
}

impl Error {
    pub(crate) fn configuration(capability: &str, reason: impl fmt::Display) -> Self {
        Error::Configuration {
            capability: capability.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn validation(capability: &str, phase: Phase, reason: impl fmt::Display) -> Self {
        Error::Validation {
            capability: capability.to_string(),
            phase,
            reason: reason.to_string(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_collaborator(&self) -> bool {
        matches!(self, Error::Collaborator { .. })
    }
}
