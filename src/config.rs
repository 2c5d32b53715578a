//! Environment-driven settings for the language-model endpoint.

pub const DEFAULT_NIM_BASE_URL: &str = "http://localhost:8202";
pub const DEFAULT_MODEL_NAME: &str = "meta/llama3.1-8b-instruct";

/// Settings read from `NIM_BASE_URL`, `NVIDIA_API_KEY` and `MODEL_NAME`.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub nim_base_url: String,
    pub nim_api_key: String,
    pub model_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nim_base_url: DEFAULT_NIM_BASE_URL.to_string(),
            nim_api_key: String::new(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Loads `.env` (if present) into the process environment, then reads it.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Unset or blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };
        Self {
            nim_base_url: read("NIM_BASE_URL", defaults.nim_base_url),
            nim_api_key: read("NVIDIA_API_KEY", defaults.nim_api_key),
            model_name: read("MODEL_NAME", defaults.model_name),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("nim_base_url", &self.nim_base_url)
            .field("nim_api_key", &if self.nim_api_key.is_empty() { "" } else { "<redacted>" })
            .field("model_name", &self.model_name)
            .finish()
    }
}
