//! NVIDIA NIM client
//!
//! NIM endpoints speak the OpenAI chat-completions protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use std::pin::Pin;
use std::time::Duration;

use crate::config::Settings;
use crate::llm::{LLMError, LanguageModel};

/// Configuration for the NIM client
#[derive(Clone, Debug)]
pub struct NimConfig {
    /// Base URL (default: http://localhost:8202)
    pub base_url: String,
    /// Bearer token, may be empty for local deployments
    pub api_key: String,
    /// Default model to use (default: meta/llama3.1-8b-instruct)
    pub default_model: String,
    /// Upper bound on one request, including reading the body (default: 120s)
    pub timeout: Duration,
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

impl Default for NimConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for NimConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            base_url: settings.nim_base_url.clone(),
            api_key: settings.nim_api_key.clone(),
            default_model: settings.model_name.clone(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Request structure for chat completions
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

/// A message in chat format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Response from chat completions
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, trimmed. Missing or blank content is an error.
    pub fn into_content(self) -> Result<String, LLMError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::InvalidResponse("No choices in response".to_string()))?;
        let content = choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| LLMError::InvalidResponse("Response has no message content".to_string()))?;
        let content = content.trim();
        if content.is_empty() {
            return Err(LLMError::InvalidResponse(
                "Response content is empty".to_string(),
            ));
        }
        Ok(content.to_string())
    }
}

/// OpenAI-compatible client for a NIM endpoint.
#[derive(Clone, Debug)]
pub struct NimClient {
    client: reqwest::Client,
    config: NimConfig,
}

impl NimClient {
    pub fn new(config: NimConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(NimConfig::from(settings))
    }

    pub fn config(&self) -> &NimConfig {
        &self.config
    }

    /// Starts a chat completion.
    pub fn chat(&self) -> CompletionBuilder<'_> {
        CompletionBuilder::new(self)
    }

    pub async fn call_chat(&self, request: &ChatRequest) -> Result<ChatResponse, LLMError> {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, self.send_chat(request))
            .await
            .map_err(|_| LLMError::Timeout(timeout))?
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, LLMError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let mut builder = self.client.post(url).json(request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::Provider(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        decode_chat(&body)
    }
}

fn decode_chat(body: &str) -> Result<ChatResponse, LLMError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl LanguageModel for NimClient {
    async fn complete(&self, prompt: &str, model: Option<String>) -> Result<String, LLMError> {
        let mut builder = CompletionBuilder::new(self).user(prompt);
        if let Some(m) = model {
            builder = builder.model(m);
        }
        builder.execute().await
    }
}

/// Builder for chat completions
pub struct CompletionBuilder<'a> {
    client: &'a NimClient,
    model: Option<String>,
    messages: Vec<ChatMessage>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl<'a> CompletionBuilder<'a> {
    pub fn new(client: &'a NimClient) -> Self {
        Self {
            client,
            model: None,
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the model for this completion (overrides default)
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Add a system message
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::system(content));
        self
    }

    /// Add a user message
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::user(content));
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of tokens to generate
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn into_request(self) -> (&'a NimClient, ChatRequest) {
        let model = self
            .model
            .unwrap_or_else(|| self.client.config.default_model.clone());
        let request = ChatRequest {
            model,
            messages: self.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };
        (self.client, request)
    }

    pub async fn execute(self) -> Result<String, LLMError> {
        if self.messages.is_empty() {
            return Err(LLMError::InvalidResponse(
                "Completion requested without messages".to_string(),
            ));
        }
        let (client, request) = self.into_request();
        log::debug!("Requesting chat completion from model '{}'", request.model);
        client.call_chat(&request).await?.into_content()
    }
}

impl<'a> IntoFuture for CompletionBuilder<'a> {
    type Output = Result<String, LLMError>;
    type IntoFuture = Pin<Box<dyn std::future::Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}
