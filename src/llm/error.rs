use thiserror::Error;

#[derive(Debug, Error)]
pub enum LLMError {
    #[cfg(feature = "llm")]
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
}
