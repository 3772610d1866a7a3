//! # Table Question-Answering Prompts

/// Placeholders: `{question}`, `{context}`
pub const TABLE_QA_PROMPT: &str = "read this table and answer question: {question}:\n{context}";

/// The questions asked of the Alphabet Q1 2024 earnings release in the lab.
pub const DEFAULT_TABLE_QUESTIONS: [&str; 3] = [
    "What was Google's operating margin for 2024?",
    "What % Net income is of the Revenues?",
    "What is the sum of Google Services and Google Cloud revenues for Q1 2024?",
];

/// Fills in [`TABLE_QA_PROMPT`].
///
/// Placeholder text inside the question or the document is left as-is.
pub fn build_table_qa_prompt(question: &str, context_html: &str) -> String {
    TABLE_QA_PROMPT
        .replace("{context}", context_html)
        .replacen("{question}", question, 1)
}
