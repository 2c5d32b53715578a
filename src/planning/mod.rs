//! Event-planning capabilities and a prebuilt planning workflow.
//!
//! | Capability               | Collaborator   |
//! |--------------------------|----------------|
//! | `generate_event_themes`  | language model |
//! | `refine_event_plan`      | language model |
//! | `fetch_moderators`       | event store    |
//! | `fetch_participants`     | event store    |

pub mod lookup;
pub mod plan;
pub mod themes;

pub use lookup::{
    FETCH_MODERATORS, FETCH_PARTICIPANTS, FetchOutput, ModeratorFilter, ModeratorLookup,
    ModeratorsConfig, ParticipantFilter, ParticipantLookup, ParticipantsConfig,
};
pub use plan::{EventPlanInput, EventPlanOutput, PlanConfig, PlanRefiner, REFINE_EVENT_PLAN};
pub use themes::{EventIdeaInput, GENERATE_EVENT_THEMES, ThemeConfig, ThemeGenerator, ThemesOutput};

use serde::{Deserialize, Serialize};

use crate::core::NodeValue;
use crate::core::error::Error;
use crate::core::registry::Registry;
use crate::core::workflow::{Step, WorkflowSpec};

/// Registers the four planning capabilities.
///
/// Language-model and store collaborators are taken from the registry's resources
/// when a capability is resolved, not here.
pub fn register_event_planning(registry: &mut Registry) -> Result<(), Error> {
    registry.register(GENERATE_EVENT_THEMES, ThemeGenerator::setup)?;
    registry.register(REFINE_EVENT_PLAN, PlanRefiner::setup)?;
    registry.register(FETCH_MODERATORS, ModeratorLookup::setup)?;
    registry.register(FETCH_PARTICIPANTS, ParticipantLookup::setup)?;
    Ok(())
}

/// Logistics of the event being planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventLogistics {
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub event_type: String,
}

/// Initial input of [`event_planning_pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanningRequest {
    pub idea: EventIdeaInput,
    pub event: EventLogistics,
    #[serde(default)]
    pub moderators: ModeratorFilter,
    #[serde(default)]
    pub participants: ParticipantFilter,
}

impl PlanningRequest {
    pub fn new(event_idea: impl Into<String>, event: EventLogistics) -> Self {
        Self {
            idea: EventIdeaInput {
                event_idea: event_idea.into(),
            },
            event,
            moderators: ModeratorFilter::default(),
            participants: ParticipantFilter::default(),
        }
    }

    pub fn moderators(mut self, filter: ModeratorFilter) -> Self {
        self.moderators = filter;
        self
    }

    pub fn participants(mut self, filter: ParticipantFilter) -> Self {
        self.participants = filter;
        self
    }

    pub fn into_input(self) -> Result<NodeValue, Error> {
        serde_json::to_value(self).map_err(|e| Error::configuration("planning_request", e))
    }
}

/// Themes, then moderators, then participants, then a plan built on the first theme
/// and the fetched moderators.
///
/// Run it with a [`PlanningRequest`]. Publishes `themes`, `moderators`, `participants`
/// and `plan`.
pub fn event_planning_pipeline() -> WorkflowSpec {
    WorkflowSpec::Sequential {
        steps: vec![
            Step::new(GENERATE_EVENT_THEMES, "themes").input_key("$input.idea"),
            Step::new(FETCH_MODERATORS, "moderators").input_key("$input.moderators"),
            Step::new(FETCH_PARTICIPANTS, "participants").input_key("$input.participants"),
            Step::new(REFINE_EVENT_PLAN, "plan")
                .input_key("$input.event")
                .bind("selected_theme", "themes.themes.0")
                .bind("moderators", "moderators.records"),
        ],
    }
}
