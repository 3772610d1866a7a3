//! # Query Misspelling Generator
//!
//! Produces typo'd variants of a search query by asking a completion backend
//! and parsing its free-text answer. Used to check how robust a search engine
//! is to misspelled input.

use crate::{
    constants::DEFAULT_ABBREVIATIONS,
    errors::PromptError,
    prompts::misspell::{build_misspelling_prompt, get_abbreviation_list},
    providers::ai::AiProvider,
};
use std::collections::BTreeSet;
use tracing::{debug, error, info};

/// What a generation attempt produced.
#[derive(Debug)]
pub enum MisspellingOutcome {
    /// The completion call succeeded. Zero variants is a valid result.
    Generated(Vec<String>),
    /// The completion call failed; no variants were parsed.
    CompletionFailed(PromptError),
}

impl MisspellingOutcome {
    /// The parsed variants, or an empty slice when the call failed.
    pub fn variants(&self) -> &[String] {
        match self {
            MisspellingOutcome::Generated(variants) => variants,
            MisspellingOutcome::CompletionFailed(_) => &[],
        }
    }

    pub fn into_variants(self) -> Vec<String> {
        match self {
            MisspellingOutcome::Generated(variants) => variants,
            MisspellingOutcome::CompletionFailed(_) => Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, MisspellingOutcome::CompletionFailed(_))
    }
}

/// Extracts variants from a completion response.
///
/// Only lines whose trimmed text starts with `-` count. The marker is dropped
/// and everything from the first `(` on is cut off. Empty candidates and exact
/// copies of `query` are discarded, and at most `n` are kept in the order the
/// model emitted them.
pub fn parse_variants(response: &str, query: &str, n: usize) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix('-'))
        .map(|line| line.split_once('(').map_or(line, |(head, _)| head).trim())
        .filter(|candidate| !candidate.is_empty() && *candidate != query)
        .take(n)
        .map(String::from)
        .collect()
}

/// Generates misspelled variants of search queries.
pub struct QueryMisspeller<'a> {
    ai_provider: &'a dyn AiProvider,
    abbreviations: BTreeSet<String>,
}

impl<'a> QueryMisspeller<'a> {
    /// Creates a misspeller protecting the default abbreviations.
    pub fn new(ai_provider: &'a dyn AiProvider) -> Self {
        Self {
            ai_provider,
            abbreviations: DEFAULT_ABBREVIATIONS.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Replaces the set of tokens the prompt asks the model to keep verbatim.
    pub fn with_abbreviations<I, S>(mut self, abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.abbreviations = abbreviations.into_iter().map(Into::into).collect();
        self
    }

    pub fn abbreviations(&self) -> &BTreeSet<String> {
        &self.abbreviations
    }

    /// Builds the prompt sent for `query`.
    pub fn prompt_for(&self, query: &str, n: usize) -> String {
        let abbreviations = get_abbreviation_list(self.abbreviations.iter().map(String::as_str));
        build_misspelling_prompt(query, n, &abbreviations)
    }

    /// Asks the model for up to `n` misspellings of `query`.
    ///
    /// Never fails: a completion error is logged and reported as
    /// [`MisspellingOutcome::CompletionFailed`].
    pub async fn generate(&self, query: &str, n: usize) -> MisspellingOutcome {
        if n == 0 {
            debug!("Zero variants requested for '{query}'; skipping completion call.");
            return MisspellingOutcome::Generated(Vec::new());
        }

        let prompt = self.prompt_for(query, n);
        debug!(prompt = %prompt, "--> Requesting misspellings");

        match self.ai_provider.generate("", &prompt).await {
            Ok(response) => {
                debug!("<-- Misspelling response: {response}");
                let variants = parse_variants(&response, query, n);
                info!(
                    "Parsed {} of {} requested variants for '{}'",
                    variants.len(),
                    n,
                    query
                );
                MisspellingOutcome::Generated(variants)
            }
            Err(e) => {
                error!("Error generating misspellings: {e}");
                MisspellingOutcome::CompletionFailed(e)
            }
        }
    }
}
