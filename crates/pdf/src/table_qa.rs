//! # Table Question Answering
//!
//! Flattens a parsed document into one HTML blob and asks the completion
//! backend questions about it. Answers come back verbatim; nothing here checks
//! the model's arithmetic.

use crate::document::{ChildRendering, Document};
use querylab::{
    prompts::table_qa::build_table_qa_prompt, providers::ai::AiProvider, PromptError,
};
use tracing::{debug, info};

/// Concatenates the HTML of every top-level section, each rendered with its
/// full subtree. Nested sections therefore appear exactly once, in document
/// order.
pub fn sections_html(document: &Document) -> String {
    document
        .top_level_sections()
        .iter()
        .map(|section| section.to_html(ChildRendering::Recursive))
        .collect()
}

/// Answers natural-language questions about a document's tables.
pub struct TableQuestionAnswerer<'a> {
    ai_provider: &'a dyn AiProvider,
    context_html: String,
}

impl<'a> TableQuestionAnswerer<'a> {
    pub fn new(ai_provider: &'a dyn AiProvider, document: &Document) -> Self {
        let context_html = sections_html(document);
        info!(
            "Prepared {} bytes of section HTML from {} top-level sections",
            context_html.len(),
            document.top_level_sections().len()
        );
        Self {
            ai_provider,
            context_html,
        }
    }

    pub fn context_html(&self) -> &str {
        &self.context_html
    }

    /// Sends one question with the document HTML and returns the raw answer.
    pub async fn ask(&self, question: &str) -> Result<String, PromptError> {
        info!("Asking: {question}");
        let prompt = build_table_qa_prompt(question, &self.context_html);
        let answer = self.ai_provider.generate("", &prompt).await?;
        debug!("<-- Answer: {answer}");
        Ok(answer)
    }
}
