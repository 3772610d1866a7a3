//! # Table Question-Answering Tests

use anyhow::Result;
use querylab::PromptError;
use querylab_pdf::document::Block;
use querylab_pdf::{sections_html, Document, TableQuestionAnswerer};
use querylab_test_utils::{setup_tracing, MockAiProvider};
use serde_json::json;

fn nested_document() -> Document {
    let blocks: Vec<Block> = serde_json::from_value(json!([
        { "tag": "para", "sentences": ["Cover page"] },
        { "tag": "header", "level": 0, "sentences": ["Summary"] },
        { "tag": "para", "level": 1, "sentences": ["Strong quarter."] },
        { "tag": "header", "level": 1, "sentences": ["Segments"] },
        { "tag": "table", "level": 2, "table_rows": [
            { "type": "table_header", "cells": [
                { "cell_value": "Segment" }, { "cell_value": "Q1 2024" }
            ]},
            { "type": "table_data_row", "cells": [
                { "cell_value": "Google Cloud" }, { "cell_value": "9,574" }
            ]}
        ]},
        { "tag": "header", "level": 0, "sentences": ["Outlook"] },
        { "tag": "list_item", "level": 1, "sentences": ["Capex up."] }
    ]))
    .unwrap();
    Document::from_blocks(blocks)
}

#[test]
fn test_sections_html_includes_each_section_once_in_order() {
    let html = sections_html(&nested_document());

    assert_eq!(
        html,
        "<h1>Summary</h1><p>Strong quarter.</p>\
         <h2>Segments</h2><table><tr><th>Segment</th><th>Q1 2024</th></tr>\
         <tr><td>Google Cloud</td><td>9,574</td></tr></table>\
         <h1>Outlook</h1><li>Capex up.</li>"
    );
    assert_eq!(html.matches("<h2>Segments</h2>").count(), 1);
    assert!(!html.contains("Cover page"), "root content is not a section");
}

#[test]
fn test_deeply_nested_sections_render_once() {
    let blocks: Vec<Block> = serde_json::from_value(json!([
        { "tag": "header", "level": 0, "sentences": ["A"] },
        { "tag": "header", "level": 1, "sentences": ["B"] },
        { "tag": "header", "level": 2, "sentences": ["C"] },
        { "tag": "para", "level": 3, "sentences": ["c-text"] },
        { "tag": "header", "level": 1, "sentences": ["D"] },
        { "tag": "header", "level": 3, "sentences": ["E"] },
        { "tag": "header", "level": 0, "sentences": ["F"] }
    ]))
    .unwrap();

    let html = sections_html(&Document::from_blocks(blocks));

    assert_eq!(
        html,
        "<h1>A</h1><h2>B</h2><h3>C</h3><p>c-text</p><h2>D</h2><h4>E</h4><h1>F</h1>"
    );
    assert_eq!(html.matches("c-text").count(), 1);
}

#[tokio::test]
async fn test_ask_sends_question_with_context() -> Result<()> {
    // --- 1. Arrange ---
    setup_tracing();
    let ai_provider = MockAiProvider::new();
    ai_provider.add_response("Google Cloud", "9,574");
    let doc = nested_document();
    let answerer = TableQuestionAnswerer::new(&ai_provider, &doc);

    // --- 2. Act ---
    let answer = answerer
        .ask("what was the Google Cloud revenue in Q1 2024?")
        .await?;

    // --- 3. Assert ---
    assert_eq!(answer, "9,574");
    let calls = ai_provider.get_calls();
    assert_eq!(calls.len(), 1);
    let (system, user) = &calls[0];
    assert!(system.is_empty());
    assert_eq!(
        user,
        &format!(
            "read this table and answer question: what was the Google Cloud revenue in Q1 2024?:\n{}",
            answerer.context_html()
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_questions_are_answered_in_order() -> Result<()> {
    setup_tracing();
    let ai_provider = MockAiProvider::new();
    ai_provider.add_response("first", "one");
    ai_provider.add_response("second", "two");
    let doc = nested_document();
    let answerer = TableQuestionAnswerer::new(&ai_provider, &doc);

    let mut answers = Vec::new();
    for question in ["first question", "second question"] {
        answers.push(answerer.ask(question).await?);
    }

    assert_eq!(answers, vec!["one".to_string(), "two".to_string()]);
    let calls = ai_provider.get_calls();
    assert!(calls[0].1.contains("answer question: first question:"));
    assert!(calls[1].1.contains("answer question: second question:"));
    Ok(())
}

#[tokio::test]
async fn test_completion_failure_propagates() {
    setup_tracing();
    let ai_provider = MockAiProvider::new();
    ai_provider.fail_with("model not found");
    let doc = nested_document();
    let answerer = TableQuestionAnswerer::new(&ai_provider, &doc);

    let result = answerer.ask("anything?").await;

    match result {
        Err(PromptError::AiApi(message)) => assert_eq!(message, "model not found"),
        other => panic!("expected AiApi error, got {other:?}"),
    }
}
