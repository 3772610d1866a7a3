use crate::constants::{
    DEFAULT_LOCAL_API_URL, DEFAULT_MODEL, DEFAULT_OLLAMA_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
    GEMINI_API_BASE_URL,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The kind of completion backend to talk to.
#[derive(Debug, Deserialize, Serialize, Default, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Ollama's native `/api/generate` endpoint.
    #[default]
    Ollama,
    /// Any OpenAI-compatible chat completions endpoint.
    Local,
    /// Google Gemini.
    Gemini,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::Local => "local",
            ProviderKind::Gemini => "gemini",
        };
        f.write_str(name)
    }
}

/// Explicit configuration for a completion backend.
///
/// Every component that needs a model receives one of these (or a provider
/// built from it); nothing reads backend settings from global state.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CompletionConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// Endpoint override. When absent, a per-provider default is used.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_url: None,
            api_key: None,
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl CompletionConfig {
    /// The endpoint requests are sent to.
    pub fn resolved_api_url(&self) -> String {
        if let Some(url) = self.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.to_string();
        }
        match self.provider {
            ProviderKind::Ollama => DEFAULT_OLLAMA_API_URL.to_string(),
            ProviderKind::Local => DEFAULT_LOCAL_API_URL.to_string(),
            ProviderKind::Gemini => {
                format!("{GEMINI_API_BASE_URL}/{}:generateContent", self.model)
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns a copy of this configuration pointed at another model.
    ///
    /// For Gemini the endpoint embeds the model name, so an endpoint that was
    /// only derived (not explicitly set) follows the new model.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Returns a copy of this configuration with a different request timeout.
    pub fn with_timeout_secs(&self, request_timeout_secs: u64) -> Self {
        Self {
            request_timeout_secs,
            ..self.clone()
        }
    }
}
