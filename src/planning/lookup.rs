use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::error::{CollaboratorError, Error};
use crate::core::function::{FunctionConfig, FunctionLogic};
use crate::core::resources::Resources;
use crate::core::schema::{FieldKind, Schema};
use crate::data::{EventStore, ModeratorQuery, ModeratorRecord, ParticipantQuery, ParticipantRecord};

pub const FETCH_MODERATORS: &str = "fetch_moderators";
pub const FETCH_PARTICIPANTS: &str = "fetch_participants";

/// Records returned by a fetch. `count` always equals `records.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutput<R> {
    records: Vec<R>,
    count: usize,
}

impl<R> FetchOutput<R> {
    pub fn new(records: Vec<R>) -> Self {
        let count = records.len();
        Self { records, count }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

fn fetch_output_schema(what: &str) -> Schema {
    Schema::new()
        .required(
            "records",
            FieldKind::array_of(FieldKind::Object),
            format!("Matching {} in store order", what),
        )
        .required("count", FieldKind::Integer, "Number of records returned")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeratorsConfig {}

impl FunctionConfig for ModeratorsConfig {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeratorFilter {
    #[serde(default)]
    pub names: Option<Vec<String>>,
    #[serde(default)]
    pub expertise: Option<String>,
}

pub struct ModeratorLookup {
    store: Arc<dyn EventStore>,
}

impl ModeratorLookup {
    pub fn setup(_config: ModeratorsConfig, resources: &Resources) -> Result<Self, Error> {
        Ok(Self {
            store: resources.require_store(FETCH_MODERATORS)?,
        })
    }
}

#[async_trait]
impl FunctionLogic for ModeratorLookup {
    type Input = ModeratorFilter;
    type Output = FetchOutput<ModeratorRecord>;

    fn description(&self) -> &str {
        "Fetch moderator details by name or expertise"
    }

    fn input_schema(&self) -> Schema {
        Schema::new()
            .optional(
                "names",
                FieldKind::array_of(FieldKind::String),
                "Exact moderator names; takes precedence over expertise",
            )
            .optional("expertise", FieldKind::String, "Partial expertise match")
    }

    fn output_schema(&self) -> Schema {
        fetch_output_schema("moderators")
    }

    async fn call(&self, input: ModeratorFilter) -> Result<Self::Output, CollaboratorError> {
        let query = ModeratorQuery::from_filter(input.names, input.expertise);
        let records = self.store.fetch_moderators(&query).await?;
        log::debug!("Fetched {} moderators for {:?}", records.len(), query);
        Ok(FetchOutput::new(records))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticipantsConfig {
    /// Limit applied when a call carries neither names nor a limit.
    #[serde(default)]
    pub default_limit: Option<usize>,
}

impl FunctionConfig for ParticipantsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_limit == Some(0) {
            return Err("default_limit must be at least 1 when set".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticipantFilter {
    #[serde(default)]
    pub names: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<usize>,
}

pub struct ParticipantLookup {
    store: Arc<dyn EventStore>,
    default_limit: Option<usize>,
}

impl ParticipantLookup {
    pub fn setup(config: ParticipantsConfig, resources: &Resources) -> Result<Self, Error> {
        Ok(Self {
            store: resources.require_store(FETCH_PARTICIPANTS)?,
            default_limit: config.default_limit,
        })
    }
}

#[async_trait]
impl FunctionLogic for ParticipantLookup {
    type Input = ParticipantFilter;
    type Output = FetchOutput<ParticipantRecord>;

    fn description(&self) -> &str {
        "Fetch participant details by name, or the first N participants"
    }

    fn input_schema(&self) -> Schema {
        Schema::new()
            .optional(
                "names",
                FieldKind::array_of(FieldKind::String),
                "Exact participant names; takes precedence over limit",
            )
            .optional("limit", FieldKind::Integer, "Maximum records to return; 0 means no limit")
    }

    fn output_schema(&self) -> Schema {
        fetch_output_schema("participants")
    }

    async fn call(&self, input: ParticipantFilter) -> Result<Self::Output, CollaboratorError> {
        let query = ParticipantQuery::from_filter(input.names, input.limit.or(self.default_limit));
        let records = self.store.fetch_participants(&query).await?;
        log::debug!("Fetched {} participants for {:?}", records.len(), query);
        Ok(FetchOutput::new(records))
    }
}
