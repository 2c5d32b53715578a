use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::error::{CollaboratorError, Error};
use crate::core::function::{FunctionConfig, FunctionLogic};
use crate::core::resources::Resources;
use crate::core::schema::{FieldKind, Schema};
use crate::data::ModeratorRecord;
use crate::llm::LanguageModel;

pub const REFINE_EVENT_PLAN: &str = "refine_event_plan";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfig {
    #[serde(default)]
    pub model: Option<String>,
}

impl FunctionConfig for PlanConfig {}

/// The chosen theme plus logistics. Dates and times are passed through as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventPlanInput {
    pub selected_theme: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub event_type: String,
    #[serde(default)]
    pub moderators: Vec<ModeratorRecord>,
}

impl EventPlanInput {
    pub fn is_single_day(&self) -> bool {
        self.start_date.trim() == self.end_date.trim()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPlanOutput {
    pub refined_plan: String,
    pub event_details: EventPlanInput,
}

pub struct PlanRefiner {
    llm: Arc<dyn LanguageModel>,
    model: Option<String>,
}

impl PlanRefiner {
    pub fn setup(config: PlanConfig, resources: &Resources) -> Result<Self, Error> {
        Ok(Self {
            llm: resources.require_llm(REFINE_EVENT_PLAN)?,
            model: config.model,
        })
    }
}

#[async_trait]
impl FunctionLogic for PlanRefiner {
    type Input = EventPlanInput;
    type Output = EventPlanOutput;

    fn description(&self) -> &str {
        "Refine a selected theme into a detailed agenda and invitation draft"
    }

    fn input_schema(&self) -> Schema {
        Schema::new()
            .required("selected_theme", FieldKind::String, "Theme to plan around")
            .required("start_date", FieldKind::String, "First day of the event")
            .required("end_date", FieldKind::String, "Last day of the event")
            .required("start_time", FieldKind::String, "Daily start time")
            .required("end_time", FieldKind::String, "Daily end time")
            .required("location", FieldKind::String, "Venue")
            .required("event_type", FieldKind::String, "Kind of event, e.g. workshop")
            .optional(
                "moderators",
                FieldKind::array_of(FieldKind::Object),
                "Moderator records to feature in the agenda",
            )
    }

    fn output_schema(&self) -> Schema {
        Schema::new()
            .required("refined_plan", FieldKind::String, "Agenda and invitation draft")
            .required("event_details", FieldKind::Object, "The structured input, echoed")
    }

    async fn call(&self, input: EventPlanInput) -> Result<EventPlanOutput, CollaboratorError> {
        let prompt = plan_prompt(&input);
        let refined_plan = self.llm.complete(&prompt, self.model.clone()).await?;
        Ok(EventPlanOutput {
            refined_plan: refined_plan.trim().to_string(),
            event_details: input,
        })
    }
}

fn moderator_line(moderators: &[ModeratorRecord]) -> String {
    if moderators.is_empty() {
        return "No specific moderators provided.".to_string();
    }
    let described: Vec<String> = moderators
        .iter()
        .map(|m| {
            let expertise = m.description.as_deref().unwrap_or("events");
            match m.city.as_deref() {
                Some(city) => format!("{} from {} with expertise in {}", m.name, city, expertise),
                None => format!("{} with expertise in {}", m.name, expertise),
            }
        })
        .collect();
    format!("The moderators for this event are: {}.", described.join("; "))
}

/// Builds the agenda prompt. Multi-day events ask for the agenda split across days.
pub fn plan_prompt(input: &EventPlanInput) -> String {
    let moderators = moderator_line(&input.moderators);
    let EventPlanInput {
        selected_theme,
        start_date,
        end_date,
        start_time,
        end_time,
        location,
        event_type,
        ..
    } = input;

    if input.is_single_day() {
        format!(
            "Using the theme: '{selected_theme}', provide a detailed descriptive agenda with timings \
             (from {start_time} to {end_time}), location, target audience, and purpose for the event on {start_date}. \
             It is a {event_type} event at {location}. {moderators} \
             Additionally, draft a professional and concise email invitation content that includes the event title, \
             date, time, location, and a brief overview to invite participants."
        )
    } else {
        format!(
            "Using the theme: '{selected_theme}', provide a detailed descriptive agenda with timings \
             (from {start_time} to {end_time}), location, target audience, and purpose for the event \
             from {start_date} to {end_date}. It is a {event_type} event at {location}. {moderators} \
             Please make sure to split the agenda across all days ({start_date} to {end_date}), \
             showing a balanced distribution of sessions, breaks, and networking events for each day. \
             Additionally, draft a professional and concise email invitation content that includes the event title, \
             date range, daily timings, location, and a brief overview to invite participants."
        )
    }
}
