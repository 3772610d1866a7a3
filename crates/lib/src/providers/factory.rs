//! # AI Provider Factory
//!
//! Turns an explicit [`CompletionConfig`] into a boxed [`AiProvider`]. Callers
//! that want to compare several models build one provider per model with
//! [`create_provider_for_model`].

use crate::{
    errors::PromptError,
    providers::ai::{
        gemini::GeminiProvider, local::LocalAiProvider, ollama::OllamaProvider, AiProvider,
    },
    types::{CompletionConfig, ProviderKind},
};
use tracing::info;

/// Creates the AI provider described by `config`.
pub fn create_provider(config: &CompletionConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    let api_url = config.resolved_api_url();
    let timeout = config.request_timeout();
    info!(
        "Configuring {} provider for model '{}' at {}",
        config.provider, config.model, api_url
    );

    let provider: Box<dyn AiProvider> = match config.provider {
        ProviderKind::Ollama => Box::new(OllamaProvider::new(
            api_url,
            config.model.clone(),
            timeout,
        )?),
        ProviderKind::Local => Box::new(LocalAiProvider::new(
            api_url,
            config.api_key.clone(),
            Some(config.model.clone()),
            timeout,
        )?),
        ProviderKind::Gemini => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| PromptError::MissingApiKey(config.provider.to_string()))?;
            Box::new(GeminiProvider::new(api_url, api_key, timeout)?)
        }
    };

    Ok(provider)
}

/// Creates a provider for `model_name`, keeping every other setting of `config`.
pub fn create_provider_for_model(
    config: &CompletionConfig,
    model_name: &str,
) -> Result<Box<dyn AiProvider>, PromptError> {
    if model_name.trim().is_empty() {
        return Err(PromptError::MissingAiProvider(
            "model name must not be empty".to_string(),
        ));
    }
    create_provider(&config.with_model(model_name))
}
