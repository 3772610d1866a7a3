//! # Shared Constants
//!
//! Default endpoints, models and limits shared by every crate in the
//! `querylab` workspace.

/// Native generate endpoint of a locally running Ollama instance.
pub const DEFAULT_OLLAMA_API_URL: &str = "http://localhost:11434/api/generate";

/// OpenAI-compatible chat endpoint exposed by the same local Ollama instance.
pub const DEFAULT_LOCAL_API_URL: &str = "http://localhost:11434/v1/chat/completions";

/// Base URL of the Google Generative Language API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// The model the labs were written against.
pub const DEFAULT_MODEL: &str = "tinyllama";

/// Default completion request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Parse endpoint of a locally running nlm-ingestor container.
pub const DEFAULT_INGESTOR_API_URL: &str = "http://localhost:5010/api/parseDocument?renderFormat=all";

/// How many misspelled variants to ask for when the caller does not say.
pub const DEFAULT_VARIANT_COUNT: usize = 3;

/// Tokens the completion service is asked to leave untouched.
pub const DEFAULT_ABBREVIATIONS: [&str; 4] = ["JFK", "NBC", "US", "UK"];
