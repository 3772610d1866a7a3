//! # Application Configuration
//!
//! Loads the `querylab` settings in layers: serde defaults, an optional YAML
//! file with `${VAR}` substitution, `QUERYLAB_`-prefixed environment
//! variables, and finally an `AI_API_KEY` fallback for the completion key.
//! Command-line flags are applied on top by the caller.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use querylab::constants::{
    DEFAULT_ABBREVIATIONS, DEFAULT_INGESTOR_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_VARIANT_COUNT,
};
use querylab::prompts::table_qa::DEFAULT_TABLE_QUESTIONS;
use querylab::CompletionConfig;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "querylab.yml";

/// The Alphabet Q1 2024 earnings release.
pub const DEFAULT_PDF_SOURCE: &str =
    "https://abc.xyz/assets/91/b3/3f9213d14ce3ae27e1038e01a0e0/2024q1-alphabet-earnings-release-pdf.pdf";

pub const DEFAULT_QUERY_SOURCE: &str = "web_search_queries.csv";
pub const DEFAULT_QUERY_COLUMN: &str = "Query";
pub const DEFAULT_MAX_QUERY_INDEX: usize = 44;

/// Completion timeout for table questions.
pub const DEFAULT_TABLE_QA_TIMEOUT_SECS: u64 = 6000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    General(String),
    #[error("{0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `querylab.yml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub ingestor: IngestorConfig,
    #[serde(default)]
    pub misspell: MisspellConfig,
    #[serde(default)]
    pub table_qa: TableQaConfig,
}

/// The layout-parsing service.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct IngestorConfig {
    #[serde(default = "default_ingestor_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for IngestorConfig {
    fn default() -> Self {
        Self {
            api_url: default_ingestor_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MisspellConfig {
    /// How many variants to ask for.
    #[serde(default = "default_variants")]
    pub variants: usize,
    #[serde(default = "default_abbreviations")]
    pub abbreviations: Vec<String>,
    #[serde(default = "default_query_column")]
    pub query_column: String,
    /// Highest row index a random pick may land on.
    #[serde(default = "default_max_query_index")]
    pub max_query_index: usize,
    /// CSV file, CSV URL or Google Sheet the queries come from.
    #[serde(default = "default_query_source")]
    pub source: String,
}

impl Default for MisspellConfig {
    fn default() -> Self {
        Self {
            variants: default_variants(),
            abbreviations: default_abbreviations(),
            query_column: default_query_column(),
            max_query_index: default_max_query_index(),
            source: default_query_source(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TableQaConfig {
    #[serde(default = "default_pdf_source")]
    pub pdf_source: String,
    #[serde(default = "default_questions")]
    pub questions: Vec<String>,
    /// Completion timeout used for table questions.
    #[serde(default = "default_table_qa_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TableQaConfig {
    fn default() -> Self {
        Self {
            pdf_source: default_pdf_source(),
            questions: default_questions(),
            request_timeout_secs: default_table_qa_timeout_secs(),
        }
    }
}

fn default_ingestor_api_url() -> String {
    DEFAULT_INGESTOR_API_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_variants() -> usize {
    DEFAULT_VARIANT_COUNT
}
fn default_abbreviations() -> Vec<String> {
    DEFAULT_ABBREVIATIONS.iter().map(|a| a.to_string()).collect()
}
fn default_query_column() -> String {
    DEFAULT_QUERY_COLUMN.to_string()
}
fn default_max_query_index() -> usize {
    DEFAULT_MAX_QUERY_INDEX
}
fn default_query_source() -> String {
    DEFAULT_QUERY_SOURCE.to_string()
}
fn default_pdf_source() -> String {
    DEFAULT_PDF_SOURCE.to_string()
}
fn default_questions() -> Vec<String> {
    DEFAULT_TABLE_QUESTIONS.iter().map(|q| q.to_string()).collect()
}
fn default_table_qa_timeout_secs() -> u64 {
    DEFAULT_TABLE_QA_TIMEOUT_SECS
}

// Reads a file and replaces `${VAR}` with the variable's value (empty if unset).
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Regex compilation failed: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded_content.into_owned()))
}

/// Loads the application configuration.
///
/// - `config_path_override` must exist when given; otherwise `./querylab.yml`
///   is used if present.
/// - Nested keys are overridden by `QUERYLAB_...` variables, e.g.
///   `QUERYLAB_COMPLETION__MODEL=llama3` or
///   `QUERYLAB_MISSPELL__ABBREVIATIONS=JFK,NASA`.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let file_content = match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            Some(content)
        }
        None => {
            let content = read_and_substitute(DEFAULT_CONFIG_FILE)?;
            if content.is_some() {
                info!("Loading configuration from '{DEFAULT_CONFIG_FILE}'.");
            }
            content
        }
    };
    if let Some(content) = file_content {
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("QUERYLAB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("misspell.abbreviations"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    if config.completion.api_key.as_deref().is_none_or(str::is_empty) {
        if let Ok(key) = env::var("AI_API_KEY") {
            if !key.is_empty() {
                config.completion.api_key = Some(key);
            }
        }
    }

    Ok(config)
}
