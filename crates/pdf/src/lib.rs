//! # querylab-pdf: Layout-Parsed PDFs
//!
//! This crate reads PDFs through an external layout-parsing service, rebuilds
//! their section hierarchy, and asks a completion backend questions about the
//! tables they contain.

pub mod document;
pub mod reader;
pub mod table_qa;

pub use document::{ChildRendering, Document, Node, Section, Table};
pub use reader::LayoutPdfReader;
pub use table_qa::{sections_html, TableQuestionAnswerer};

use thiserror::Error;

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum PdfIngestError {
    #[error("Failed to read PDF from '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to fetch PDF: {0}")]
    Fetch(String),
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Layout parser returned {status}: {body}")]
    ParserApi { status: u16, body: String },
    #[error("Malformed layout parser response: {0}")]
    MalformedResponse(String),
}
