use std::time::Duration;
use thiserror::Error;

/// Custom error types for talking to a completion backend.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Request to AI provider timed out after {0:?}")]
    AiTimeout(Duration),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("API key is missing for the '{0}' provider")]
    MissingApiKey(String),
    #[error("AI provider is not configured: {0}")]
    MissingAiProvider(String),
}
