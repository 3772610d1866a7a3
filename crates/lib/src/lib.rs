//! # querylab
//!
//! Core of the `querylab` workspace: explicit completion-backend configuration,
//! the `AiProvider` abstraction with its Ollama, OpenAI-compatible and Gemini
//! implementations, prompt templates, and the query misspelling generator.
//!
//! Document ingestion and table question-answering live in `querylab-pdf`;
//! tabular query sources live in `querylab-sheets`.

pub mod constants;
pub mod errors;
pub mod misspell;
pub mod prompts;
pub mod providers;
pub mod types;

pub use errors::PromptError;
pub use misspell::{parse_variants, MisspellingOutcome, QueryMisspeller};
pub use providers::factory::{create_provider, create_provider_for_model};
pub use types::{CompletionConfig, ProviderKind};
