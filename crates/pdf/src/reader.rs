//! # Layout-Parsing Client
//!
//! Sends a PDF to an nlm-ingestor compatible `parseDocument` endpoint and turns
//! the returned block list into a [`Document`].

use crate::{document::Block, Document, PdfIngestError};
use reqwest::{multipart, Client as ReqwestClient};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Deserialize)]
struct ParseResponse {
    return_dict: Option<ReturnDict>,
}

#[derive(Deserialize)]
struct ReturnDict {
    result: Option<ParseResult>,
}

#[derive(Deserialize)]
struct ParseResult {
    #[serde(default)]
    blocks: Vec<Block>,
}

/// Reads PDFs through a remote layout-parsing service.
#[derive(Clone, Debug)]
pub struct LayoutPdfReader {
    client: ReqwestClient,
    parser_api_url: String,
}

impl LayoutPdfReader {
    pub fn new(parser_api_url: String, timeout: Duration) -> Result<Self, PdfIngestError> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            parser_api_url,
        })
    }

    /// Parses the PDF at `source`, an `http(s)` URL or a local file path.
    #[instrument(skip(self))]
    pub async fn read_pdf(&self, source: &str) -> Result<Document, PdfIngestError> {
        let (file_name, pdf_data) = self.load_source(source).await?;
        self.parse_bytes(&file_name, pdf_data).await
    }

    /// Uploads raw PDF bytes to the parser and builds the document tree.
    #[instrument(skip(self, pdf_data), fields(bytes = pdf_data.len()))]
    pub async fn parse_bytes(
        &self,
        file_name: &str,
        pdf_data: Vec<u8>,
    ) -> Result<Document, PdfIngestError> {
        let part = multipart::Part::bytes(pdf_data)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("file", part);

        info!("Sending '{}' to parser at {}", file_name, self.parser_api_url);
        let response = self
            .client
            .post(&self.parser_api_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PdfIngestError::ParserApi {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ParseResponse = response
            .json()
            .await
            .map_err(|e| PdfIngestError::MalformedResponse(e.to_string()))?;
        let blocks = parsed
            .return_dict
            .and_then(|d| d.result)
            .map(|r| r.blocks)
            .ok_or_else(|| {
                PdfIngestError::MalformedResponse("missing return_dict.result".to_string())
            })?;

        debug!("Parser returned {} blocks", blocks.len());
        if blocks.is_empty() {
            warn!("Parser returned no blocks for '{}'", file_name);
        }
        Ok(Document::from_blocks(blocks))
    }

    async fn load_source(&self, source: &str) -> Result<(String, Vec<u8>), PdfIngestError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            info!("Downloading PDF from {source}");
            let response = self.client.get(source).send().await?;
            if !response.status().is_success() {
                return Err(PdfIngestError::Fetch(format!(
                    "GET {source} failed with status: {}",
                    response.status()
                )));
            }
            let bytes = response.bytes().await?;
            Ok((file_name_of(source), bytes.to_vec()))
        } else {
            let data = tokio::fs::read(source).await.map_err(|e| PdfIngestError::Io {
                path: source.to_string(),
                source: e,
            })?;
            Ok((file_name_of(source), data))
        }
    }
}

/// Last path segment of a URL or file path, without any query string.
fn file_name_of(source: &str) -> String {
    let without_query = source.split(['?', '#']).next().unwrap_or(source);
    Path::new(without_query)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("document.pdf")
        .to_string()
}
