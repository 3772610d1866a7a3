pub mod gemini;
pub mod local;
pub mod ollama;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;
use std::time::Duration;

/// A trait for interacting with an AI provider.
///
/// This trait defines a common interface for text completion across different
/// Large Language Model backends (e.g., Ollama, OpenAI-compatible servers, Gemini).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// An empty `system_prompt` means "no system prompt"; providers leave it
    /// out of the request entirely.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);

/// Maps a failed `send()` to the matching `PromptError`.
pub(crate) fn send_error(err: reqwest::Error, timeout: Duration) -> PromptError {
    if err.is_timeout() {
        PromptError::AiTimeout(timeout)
    } else {
        PromptError::AiRequest(err)
    }
}

/// Builds the shared HTTP client used by every provider.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, PromptError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(PromptError::ReqwestClientBuild)
}
