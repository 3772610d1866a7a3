//! # `querylab` Library Crate
//!
//! Command-line surface for the two lab flows: asking questions about the
//! tables in a PDF, and generating misspelled variants of search queries.

pub mod config;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use querylab::{
    create_provider, create_provider_for_model, providers::ai::AiProvider, CompletionConfig,
    MisspellingOutcome, ProviderKind, QueryMisspeller,
};
use querylab_pdf::{LayoutPdfReader, TableQuestionAnswerer};
use querylab_sheets::QueryTable;
use std::time::Duration;
use tracing::info;

use crate::config::{get_config, AppConfig, MisspellConfig};

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML configuration file.
    #[arg(long, global = true, env = "QUERYLAB_CONFIG")]
    pub config: Option<String>,
    /// Completion backend: `ollama`, `local` or `gemini`.
    #[arg(long, global = true, value_parser = parse_provider_kind)]
    pub provider: Option<ProviderKind>,
    /// Completion endpoint, overriding the provider default.
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Completion request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask natural-language questions about the tables in a PDF
    TableQa(TableQaArgs),
    /// Generate misspelled variants of a search query
    Misspell(MisspellArgs),
}

#[derive(Parser, Debug)]
pub struct TableQaArgs {
    /// PDF URL or local path.
    #[arg(long)]
    pub pdf: Option<String>,
    /// Layout parser endpoint.
    #[arg(long)]
    pub ingestor_url: Option<String>,
    /// A question to ask. Repeat for several; replaces the configured list.
    #[arg(long = "question")]
    pub questions: Vec<String>,
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Parser, Debug)]
pub struct MisspellArgs {
    /// CSV file, CSV URL or Google Sheet to pick a query from.
    #[arg(long, conflicts_with = "query")]
    pub csv: Option<String>,
    /// Misspell this query instead of reading one from a table.
    #[arg(long)]
    pub query: Option<String>,
    /// Column holding the queries.
    #[arg(long, conflicts_with = "query")]
    pub column: Option<String>,
    /// Use this row instead of a random one.
    #[arg(long, conflicts_with = "query")]
    pub row: Option<usize>,
    /// Number of variants to ask for.
    #[arg(short = 'n', long = "count")]
    pub count: Option<usize>,
    /// A token the model must keep verbatim. Repeat for several.
    #[arg(long = "abbreviation")]
    pub abbreviations: Vec<String>,
    /// Model to ask. Repeat to compare several models on the same query.
    #[arg(long = "model")]
    pub models: Vec<String>,
}

fn parse_provider_kind(value: &str) -> Result<ProviderKind, String> {
    match value.to_ascii_lowercase().as_str() {
        "ollama" => Ok(ProviderKind::Ollama),
        "local" => Ok(ProviderKind::Local),
        "gemini" => Ok(ProviderKind::Gemini),
        other => Err(format!(
            "unknown provider '{other}' (expected ollama, local or gemini)"
        )),
    }
}

// --- Public Entrypoint ---

/// The main entry point for the `querylab` library.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = get_config(cli.config.as_deref())?;
    apply_global_overrides(&mut config.completion, &cli);

    match cli.command {
        Commands::TableQa(args) => handle_table_qa(&config, cli.timeout_secs, args).await,
        Commands::Misspell(args) => handle_misspell(&config, cli.timeout_secs, args).await,
    }
}

fn apply_global_overrides(completion: &mut CompletionConfig, cli: &Cli) {
    if let Some(provider) = cli.provider {
        completion.provider = provider;
    }
    if let Some(api_url) = &cli.api_url {
        completion.api_url = Some(api_url.clone());
    }
}

// --- Command Handlers ---

/// Handles the `querylab table-qa` command logic.
async fn handle_table_qa(
    config: &AppConfig,
    timeout_override: Option<u64>,
    args: TableQaArgs,
) -> Result<()> {
    info!("Starting 'table-qa' command with args: {:?}", args);
    let pdf_source = args
        .pdf
        .unwrap_or_else(|| config.table_qa.pdf_source.clone());
    let ingestor_url = args
        .ingestor_url
        .unwrap_or_else(|| config.ingestor.api_url.clone());
    let questions = if args.questions.is_empty() {
        config.table_qa.questions.clone()
    } else {
        args.questions
    };

    let mut completion = config
        .completion
        .with_timeout_secs(timeout_override.unwrap_or(config.table_qa.request_timeout_secs));
    if let Some(model) = args.model.as_deref() {
        completion = completion.with_model(model);
    }
    let ai_provider = create_provider(&completion)?;

    let reader = LayoutPdfReader::new(
        ingestor_url,
        Duration::from_secs(config.ingestor.request_timeout_secs),
    )?;
    let document = reader
        .read_pdf(&pdf_source)
        .await
        .with_context(|| format!("Failed to read PDF '{pdf_source}'"))?;

    let answerer = TableQuestionAnswerer::new(ai_provider.as_ref(), &document);
    for question in &questions {
        let answer = answerer
            .ask(question)
            .await
            .with_context(|| format!("Failed to answer '{question}'"))?;
        println!("{answer}");
    }
    Ok(())
}

/// Handles the `querylab misspell` command logic.
async fn handle_misspell(
    config: &AppConfig,
    timeout_override: Option<u64>,
    args: MisspellArgs,
) -> Result<()> {
    info!("Starting 'misspell' command with args: {:?}", args);
    let settings = &config.misspell;
    let query = resolve_query(settings, &args).await?;
    let n = args.count.unwrap_or(settings.variants);
    let abbreviations = if args.abbreviations.is_empty() {
        settings.abbreviations.clone()
    } else {
        args.abbreviations.clone()
    };
    let completion = match timeout_override {
        Some(secs) => config.completion.with_timeout_secs(secs),
        None => config.completion.clone(),
    };

    println!("{}", format_original(&query));
    if args.models.is_empty() {
        let ai_provider = create_provider(&completion)?;
        let outcome = misspell(ai_provider.as_ref(), &abbreviations, &query, n).await;
        print!("{}", format_outcome(&outcome));
    } else {
        for model in &args.models {
            let ai_provider = create_provider_for_model(&completion, model)?;
            let outcome = misspell(ai_provider.as_ref(), &abbreviations, &query, n).await;
            println!("Model: {model}");
            print!("{}", format_outcome(&outcome));
        }
    }
    Ok(())
}

async fn misspell(
    ai_provider: &dyn AiProvider,
    abbreviations: &[String],
    query: &str,
    n: usize,
) -> MisspellingOutcome {
    QueryMisspeller::new(ai_provider)
        .with_abbreviations(abbreviations.iter().cloned())
        .generate(query, n)
        .await
}

/// The query comes from `--query`, a fixed `--row`, or a random row.
async fn resolve_query(settings: &MisspellConfig, args: &MisspellArgs) -> Result<String> {
    if let Some(query) = args.query.as_deref() {
        if query.trim().is_empty() {
            bail!("--query must not be blank");
        }
        return Ok(query.to_string());
    }

    let source = args.csv.as_deref().unwrap_or(settings.source.as_str());
    let column = args.column.as_deref().unwrap_or(settings.query_column.as_str());
    let table = QueryTable::load(source, column)
        .await
        .with_context(|| format!("Failed to load queries from '{source}'"))?;

    match args.row {
        Some(row) if row >= table.len() => bail!(
            "Row {row} is out of range: '{source}' has {} rows",
            table.len()
        ),
        Some(row) => table
            .get(row)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Row {row} of '{source}' has no value in column '{column}'")),
        None => {
            let mut rng = rand::rng();
            let (index, query) = table
                .pick_random(&mut rng, settings.max_query_index)
                .ok_or_else(|| {
                    anyhow!(
                        "No queries in column '{column}' of '{source}' within rows 0..={}",
                        settings.max_query_index
                    )
                })?;
            info!("Picked row {index} of {}", table.len());
            Ok(query.to_string())
        }
    }
}

// --- Output Formatting ---

pub fn format_original(query: &str) -> String {
    format!("Original: {query}")
}

/// The `Misspellings:` block, one numbered line per variant.
/// A failed completion prints its error and no variants.
pub fn format_outcome(outcome: &MisspellingOutcome) -> String {
    let mut out = String::from("Misspellings:\n");
    if let MisspellingOutcome::CompletionFailed(e) = outcome {
        out.push_str(&format!("Error generating misspellings: {e}\n"));
    }
    for (i, variant) in outcome.variants().iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, variant));
    }
    out
}
