//! # `querylab-sheets`: Tabular Query Sources
//!
//! Loads a column of search queries from a CSV file, a CSV URL, or a Google
//! Sheet, and picks queries from it at random.

use rand::Rng;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid Google Sheet URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to fetch sheet: {0}")]
    Fetch(String),
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Column '{0}' not found in CSV header")]
    MissingColumn(String),
}

impl From<reqwest::Error> for SheetError {
    fn from(err: reqwest::Error) -> Self {
        SheetError::Fetch(err.to_string())
    }
}

// --- Public Helper Functions ---

/// Transforms a Google Sheet URL into a CSV export URL.
pub fn construct_export_url(url_str: &str, gid: Option<&str>) -> Result<String, SheetError> {
    let parsed_url =
        reqwest::Url::parse(url_str).map_err(|e| SheetError::InvalidUrl(format!("{e}")))?;

    let re = Regex::new(r"/spreadsheets/d/([a-zA-Z0-9-_]+)")
        .map_err(|e| SheetError::InvalidUrl(format!("Regex compilation failed: {e}")))?;
    let caps = re.captures(parsed_url.path()).ok_or_else(|| {
        SheetError::InvalidUrl("Could not find sheet ID in URL path.".to_string())
    })?;

    let spreadsheet_id = caps
        .get(1)
        .map(|m| m.as_str())
        .ok_or_else(|| SheetError::InvalidUrl("Sheet ID capture group is missing.".to_string()))?;

    let base_url = match parsed_url.host_str() {
        Some("127.0.0.1") | Some("localhost") => {
            format!("{}://{}", parsed_url.scheme(), parsed_url.authority())
        }
        _ => "https://docs.google.com".to_string(),
    };
    let mut export_url = format!("{base_url}/spreadsheets/d/{spreadsheet_id}/export?format=csv");

    let gid = gid
        .map(str::to_string)
        .or_else(|| gid_from_url(&parsed_url));
    if let Some(gid_val) = gid.filter(|g| !g.is_empty()) {
        export_url.push_str(&format!("&gid={gid_val}"));
    }

    Ok(export_url)
}

/// Sheet tab id from `?gid=` or `#gid=`.
fn gid_from_url(url: &reqwest::Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "gid")
        .map(|(_, value)| value.into_owned())
        .or_else(|| {
            url.fragment()
                .and_then(|f| f.strip_prefix("gid="))
                .map(str::to_string)
        })
}

pub fn is_google_sheet_url(source: &str) -> bool {
    is_http_url(source) && source.contains("/spreadsheets/d/")
}

fn is_http_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Downloads a CSV document as a string.
pub async fn download_csv(url: &str) -> Result<String, SheetError> {
    info!("Fetching CSV from: {url}");
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(SheetError::Fetch(format!(
            "Request failed with status: {}",
            response.status()
        )));
    }
    response.text().await.map_err(SheetError::from)
}

// --- Query Table ---

/// One CSV column, indexed by data row (the header is not a row).
/// Blank cells keep their row position but hold no query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTable {
    rows: Vec<Option<String>>,
}

impl QueryTable {
    pub fn new(rows: Vec<Option<String>>) -> Self {
        Self { rows }
    }

    /// Parses CSV text with a header row and keeps the values of `column`.
    pub fn from_csv_str(content: &str, column: &str) -> Result<Self, SheetError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let index = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| SheetError::MissingColumn(column.to_string()))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let value = record
                .get(index)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            rows.push(value);
        }
        let table = Self { rows };
        debug!(
            "Loaded {} rows ({} blank) from column '{column}'",
            table.len(),
            table.len() - table.queries().len()
        );
        Ok(table)
    }

    /// Loads `column` from a Google Sheet URL, any other CSV URL, or a local
    /// file path.
    pub async fn load(source: &str, column: &str) -> Result<Self, SheetError> {
        let content = if is_google_sheet_url(source) {
            let export_url = construct_export_url(source, None)?;
            download_csv(&export_url).await?
        } else if is_http_url(source) {
            download_csv(source).await?
        } else {
            info!("Reading CSV from: {source}");
            tokio::fs::read_to_string(source)
                .await
                .map_err(|e| SheetError::Io {
                    path: source.to_string(),
                    source: e,
                })?
        };
        Self::from_csv_str(&content, column)
    }

    /// Number of data rows, blank ones included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The query in data row `row`; `None` if out of range or blank.
    pub fn get(&self, row: usize) -> Option<&str> {
        self.rows.get(row).and_then(|value| value.as_deref())
    }

    /// Every non-blank query, in row order.
    pub fn queries(&self) -> Vec<&str> {
        self.rows.iter().filter_map(|value| value.as_deref()).collect()
    }

    /// Picks uniformly among the non-blank rows in `0..=min(max_index, len - 1)`
    /// and returns the row index with its query. `None` when that range holds
    /// no query.
    pub fn pick_random<R: Rng>(&self, rng: &mut R, max_index: usize) -> Option<(usize, &str)> {
        let upper = max_index.min(self.rows.len().checked_sub(1)?);
        let candidates: Vec<(usize, &str)> = self.rows[..=upper]
            .iter()
            .enumerate()
            .filter_map(|(row, value)| value.as_deref().map(|query| (row, query)))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pick = rng.random_range(0..candidates.len());
        Some(candidates[pick])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_export_url() {
        let url = "https://docs.google.com/spreadsheets/d/1AbC-d_9/edit#gid=42";
        assert_eq!(
            construct_export_url(url, None).unwrap(),
            "https://docs.google.com/spreadsheets/d/1AbC-d_9/export?format=csv&gid=42"
        );
        assert_eq!(
            construct_export_url(url, Some("7")).unwrap(),
            "https://docs.google.com/spreadsheets/d/1AbC-d_9/export?format=csv&gid=7"
        );
    }

    #[test]
    fn test_construct_export_url_rejects_other_urls() {
        let result = construct_export_url("https://example.com/queries.csv", None);
        assert!(matches!(result, Err(SheetError::InvalidUrl(_))));
    }

    #[test]
    fn test_blank_cells_keep_row_positions() {
        let csv = "Id,Query\n1,jfk airport\n2,\n3,  nbc news \n";
        let table = QueryTable::from_csv_str(csv, "Query").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0), Some("jfk airport"));
        assert_eq!(table.get(1), None);
        assert_eq!(table.get(2), Some("nbc news"));
        assert_eq!(table.get(3), None);
        assert_eq!(table.queries(), vec!["jfk airport", "nbc news"]);
    }

    #[test]
    fn test_from_csv_str_missing_column() {
        let result = QueryTable::from_csv_str("Id,Text\n1,x\n", "Query");
        assert!(matches!(result, Err(SheetError::MissingColumn(c)) if c == "Query"));
    }
}
