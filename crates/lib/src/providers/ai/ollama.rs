use crate::{
    errors::PromptError,
    providers::ai::{build_client, send_error, AiProvider},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

// --- Ollama-native request and response structures ---

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: String,
}

// --- Ollama Provider implementation ---

/// A provider for Ollama's `/api/generate` endpoint.
#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: ReqwestClient,
    api_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaProvider {
    /// Creates a new `OllamaProvider`.
    pub fn new(api_url: String, model: String, timeout: Duration) -> Result<Self, PromptError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url,
            model,
            timeout,
        })
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        let request_body = OllamaRequest {
            model: &self.model,
            prompt: user_prompt,
            system: Some(system_prompt).filter(|s| !s.is_empty()),
            stream: false,
        };

        debug!(api_url = %self.api_url, model = %self.model, "--> Sending generate request");
        let response = self
            .client
            .post(&self.api_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(format!("{status}: {error_text}")));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        Ok(ollama_response.response)
    }
}
