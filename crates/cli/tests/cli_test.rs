//! # CLI Binary Tests
//!
//! Runs the `querylab` binary against mocked completion and layout-parsing
//! services. The binary blocks, so it runs on a blocking thread while the mock
//! servers keep serving on the test runtime.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MISSPELL_RESPONSE: &str = "Here are the misspellings:\n\
- machin learning applications (missing e)\n\
- machine learning applications (unchanged)\n\
- machine lerning aplications (missing letters)\n\
- mahcine learning applications (transposed letters)\n\
- machin lerning aplications (multiple typos)\n";

/// A `querylab` command isolated from any config file or `.env` in the
/// developer's working directory.
fn querylab(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("querylab").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("QUERYLAB_CONFIG")
        .env_remove("AI_API_KEY")
        .env("RUST_LOG", "querylab=debug");
    cmd
}

async fn run_blocking(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_misspell_prints_numbered_variants() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "tinyllama", "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": MISSPELL_RESPONSE })))
        .expect(1)
        .mount(&server)
        .await;
    let workdir = tempdir().unwrap();

    // Act
    let mut cmd = querylab(&workdir);
    cmd.arg("--provider")
        .arg("ollama")
        .arg("--api-url")
        .arg(format!("{}/api/generate", server.uri()))
        .arg("misspell")
        .arg("--query")
        .arg("machine learning applications")
        .arg("-n")
        .arg("3");
    let output = run_blocking(cmd).await;

    // Assert
    output.assert().success().stdout(predicate::str::contains(
        "Original: machine learning applications\n\
         Misspellings:\n\
         1. machin learning applications\n\
         2. machine lerning aplications\n\
         3. mahcine learning applications\n",
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_misspell_failure_still_exits_zero() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model is loading"))
        .mount(&server)
        .await;
    let workdir = tempdir().unwrap();

    // Act
    let mut cmd = querylab(&workdir);
    cmd.arg("--api-url")
        .arg(format!("{}/api/generate", server.uri()))
        .arg("misspell")
        .arg("--query")
        .arg("jfk airport parking");
    let output = run_blocking(cmd).await;

    // Assert
    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Original: jfk airport parking"))
        .stdout(predicate::str::contains("Error generating misspellings:"))
        .stdout(predicate::str::contains("1. ").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_misspell_compares_models_on_a_csv_row() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "llama3" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "response": "- nbc nightyl news (transposition)" }),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "phi3" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "response": "- nbc nigthly news (transposition)" }),
        ))
        .mount(&server)
        .await;
    let workdir = tempdir().unwrap();
    let csv_path = workdir.path().join("queries.csv");
    fs::write(&csv_path, "Id,Query\n1,jfk airport parking\n2,nbc nightly news\n").unwrap();

    // Act
    let mut cmd = querylab(&workdir);
    cmd.arg("--api-url")
        .arg(format!("{}/api/generate", server.uri()))
        .arg("misspell")
        .arg("--csv")
        .arg(csv_path.to_str().unwrap())
        .arg("--row")
        .arg("1")
        .arg("-n")
        .arg("1")
        .arg("--model")
        .arg("llama3")
        .arg("--model")
        .arg("phi3");
    let output = run_blocking(cmd).await;

    // Assert
    output.assert().success().stdout(predicate::str::contains(
        "Original: nbc nightly news\n\
         Model: llama3\n\
         Misspellings:\n\
         1. nbc nightyl news\n\
         Model: phi3\n\
         Misspellings:\n\
         1. nbc nigthly news\n",
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_table_qa_prints_answers_in_order() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/parseDocument"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return_dict": { "result": { "blocks": [
                { "tag": "header", "level": 0, "sentences": ["Revenues"] },
                { "tag": "table", "level": 1, "table_rows": [
                    { "type": "table_header", "cells": [
                        { "cell_value": "Segment" }, { "cell_value": "Q1 2024" }
                    ]},
                    { "type": "table_data_row", "cells": [
                        { "cell_value": "Google Cloud" }, { "cell_value": "9,574" }
                    ]}
                ]}
            ]}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "prompt": "read this table and answer question: What was Cloud revenue?:\n<h1>Revenues</h1><table><tr><th>Segment</th><th>Q1 2024</th></tr><tr><td>Google Cloud</td><td>9,574</td></tr></table>"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "9,574 million" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Only one segment." })))
        .mount(&server)
        .await;
    let workdir = tempdir().unwrap();
    let pdf_path = workdir.path().join("earnings.pdf");
    fs::write(&pdf_path, b"%PDF-1.4\n").unwrap();

    // Act
    let mut cmd = querylab(&workdir);
    cmd.arg("--api-url")
        .arg(format!("{}/api/generate", server.uri()))
        .arg("table-qa")
        .arg("--pdf")
        .arg(pdf_path.to_str().unwrap())
        .arg("--ingestor-url")
        .arg(format!("{}/api/parseDocument?renderFormat=all", server.uri()))
        .arg("--question")
        .arg("What was Cloud revenue?")
        .arg("--question")
        .arg("How many segments?");
    let output = run_blocking(cmd).await;

    // Assert
    output
        .assert()
        .success()
        .stdout(predicate::eq("9,574 million\nOnly one segment.\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_table_qa_parser_failure_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/parseDocument"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let workdir = tempdir().unwrap();
    let pdf_path = workdir.path().join("earnings.pdf");
    fs::write(&pdf_path, b"%PDF-1.4\n").unwrap();

    let mut cmd = querylab(&workdir);
    cmd.arg("table-qa")
        .arg("--pdf")
        .arg(pdf_path.to_str().unwrap())
        .arg("--ingestor-url")
        .arg(format!("{}/api/parseDocument", server.uri()));
    let output = run_blocking(cmd).await;

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read PDF"));
}

#[test]
fn test_misspell_missing_csv_fails() {
    let workdir = tempdir().unwrap();

    querylab(&workdir)
        .arg("misspell")
        .arg("--csv")
        .arg("a/non/existent/queries.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load queries"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let workdir = tempdir().unwrap();

    querylab(&workdir)
        .arg("--config")
        .arg("missing.yml")
        .arg("misspell")
        .arg("--query")
        .arg("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_misspell_row_counts_blank_csv_rows() {
    let workdir = tempdir().unwrap();
    let csv_path = workdir.path().join("queries.csv");
    fs::write(&csv_path, "Id,Query\n1,jfk airport\n2,\n3,uk visa\n").unwrap();

    querylab(&workdir)
        .arg("misspell")
        .arg("--csv")
        .arg(csv_path.to_str().unwrap())
        .arg("--row")
        .arg("2")
        .arg("-n")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::eq("Original: uk visa\nMisspellings:\n"));

    querylab(&workdir)
        .arg("misspell")
        .arg("--csv")
        .arg(csv_path.to_str().unwrap())
        .arg("--row")
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Row 1 of"));
}
