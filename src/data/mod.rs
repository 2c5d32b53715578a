//! Read access to moderator and participant records.
//!
//! Functions depend only on [`EventStore`]; storage itself lives behind it.
//! [`InMemoryStore`] is the bundled implementation.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryStore;

/// Upper bound on rows returned by a single read.
pub const SAFETY_CAP: usize = 1000;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("participant with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeratorRecord {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub expertise: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticipantRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when adding a moderator; id and timestamp are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewModerator {
    pub name: String,
    pub city: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub expertise: Option<String>,
}

/// Fields supplied when adding a participant; id and timestamp are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
}

/// Exactly one moderator filter mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeratorQuery {
    All,
    /// Exact match on any of the names.
    Names(Vec<String>),
    /// Case-insensitive substring match on the expertise column.
    Expertise(String),
}

impl ModeratorQuery {
    /// Picks the filter mode: a non-empty name list wins over expertise.
    pub fn from_filter(names: Option<Vec<String>>, expertise: Option<String>) -> Self {
        match (names, expertise) {
            (Some(names), _) if !names.is_empty() => ModeratorQuery::Names(names),
            (_, Some(expertise)) if !expertise.trim().is_empty() => {
                ModeratorQuery::Expertise(expertise)
            }
            _ => ModeratorQuery::All,
        }
    }
}

/// Exactly one participant filter mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantQuery {
    All,
    /// Exact match on any of the names.
    Names(Vec<String>),
    /// At most this many rows, in store order.
    Limit(usize),
}

impl ParticipantQuery {
    /// Picks the filter mode: a non-empty name list wins over the limit.
    /// A zero limit means no limit.
    pub fn from_filter(names: Option<Vec<String>>, limit: Option<usize>) -> Self {
        match (names, limit) {
            (Some(names), _) if !names.is_empty() => ParticipantQuery::Names(names),
            (_, Some(limit)) if limit > 0 => ParticipantQuery::Limit(limit),
            _ => ParticipantQuery::All,
        }
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn fetch_moderators(
        &self,
        query: &ModeratorQuery,
    ) -> Result<Vec<ModeratorRecord>, DataError>;

    async fn fetch_participants(
        &self,
        query: &ParticipantQuery,
    ) -> Result<Vec<ParticipantRecord>, DataError>;
}
