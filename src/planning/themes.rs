use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::error::{CollaboratorError, Error};
use crate::core::function::{FunctionConfig, FunctionLogic};
use crate::core::resources::Resources;
use crate::core::schema::{FieldKind, Schema};
use crate::llm::{LLMError, LanguageModel};

pub const GENERATE_EVENT_THEMES: &str = "generate_event_themes";

const DEFAULT_MAX_THEMES: usize = 5;

fn default_max_themes() -> usize {
    DEFAULT_MAX_THEMES
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    /// Overrides the language model's default model name.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_max_themes")]
    pub max_themes: usize,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_themes: DEFAULT_MAX_THEMES,
        }
    }
}

impl FunctionConfig for ThemeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_themes == 0 {
            return Err("max_themes must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventIdeaInput {
    pub event_idea: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemesOutput {
    pub themes: Vec<String>,
}

/// Turns a free-form event idea into a short list of candidate themes.
pub struct ThemeGenerator {
    llm: Arc<dyn LanguageModel>,
    model: Option<String>,
    max_themes: usize,
}

impl ThemeGenerator {
    pub fn setup(config: ThemeConfig, resources: &Resources) -> Result<Self, Error> {
        Ok(Self {
            llm: resources.require_llm(GENERATE_EVENT_THEMES)?,
            model: config.model,
            max_themes: config.max_themes,
        })
    }
}

#[async_trait]
impl FunctionLogic for ThemeGenerator {
    type Input = EventIdeaInput;
    type Output = ThemesOutput;

    fn description(&self) -> &str {
        "Generate creative and professional event themes based on an event idea"
    }

    fn input_schema(&self) -> Schema {
        Schema::new().required(
            "event_idea",
            FieldKind::String,
            "Free-form description of the event",
        )
    }

    fn output_schema(&self) -> Schema {
        Schema::new().required(
            "themes",
            FieldKind::array_of(FieldKind::String),
            "Distinct candidate themes, in the order generated",
        )
    }

    async fn call(&self, input: EventIdeaInput) -> Result<ThemesOutput, CollaboratorError> {
        let prompt = theme_prompt(&input.event_idea, self.max_themes);
        let raw = self.llm.complete(&prompt, self.model.clone()).await?;

        let themes = parse_themes(&raw, self.max_themes);
        if themes.is_empty() {
            return Err(LLMError::InvalidResponse("response contained no themes".to_string()).into());
        }
        log::debug!("Generated {} themes for '{}'", themes.len(), input.event_idea);
        Ok(ThemesOutput { themes })
    }
}

pub fn theme_prompt(event_idea: &str, count: usize) -> String {
    format!(
        "Generate exactly {count} professional, creative, and distinct event ideas \
         with titles and detailed descriptions based on: '{event_idea}'. \
         Put each theme on its own numbered line as a bold title followed by its description."
    )
}

/// Splits a model response into themes.
///
/// One theme per line. Bullets, list numbering and bold markers are stripped,
/// blank lines dropped and repeats removed keeping the first occurrence.
/// Returns at most `max` themes and never pads.
pub fn parse_themes(raw: &str, max: usize) -> Vec<String> {
    let mut themes: Vec<String> = Vec::new();
    for line in raw.lines() {
        let theme = clean_line(line);
        if theme.is_empty() || themes.contains(&theme) {
            continue;
        }
        themes.push(theme);
        if themes.len() == max {
            break;
        }
    }
    themes
}

fn clean_line(line: &str) -> String {
    let line = line.replace("**", "");
    let line = strip_bullet(line.trim_start());
    strip_numbering(line).trim().to_string()
}

/// Removes a leading run of `-`, `*`, `•`, `+` or `#` followed by whitespace.
fn strip_bullet(line: &str) -> &str {
    let rest = line.trim_start_matches(['-', '*', '•', '+', '#']);
    if rest.len() < line.len() && rest.starts_with(char::is_whitespace) {
        rest.trim_start()
    } else {
        line
    }
}

/// Removes a leading `1.`, `2)` or `3:` marker followed by whitespace or nothing.
fn strip_numbering(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return line;
    }
    match line[digits..].strip_prefix(['.', ')', ':']) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => line,
    }
}
