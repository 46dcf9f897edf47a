use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WisataError {
    #[error("Retrieval failed for {url} after {attempts} attempt(s): {reason}")]
    Retrieval {
        url: String,
        attempts: u32,
        reason: String,
    },
    #[error("No table found: {0}")]
    NoTable(String),
    #[error("No usable rows left after cleaning")]
    EmptyDataset,
    #[error("Invalid source: {0}")]
    InvalidSource(String),
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Row cap must be between {min} and {max}, got {value}")]
    InvalidRowCap { value: usize, min: usize, max: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl WisataError {
    /// True for the "nothing to show" outcomes: the source was reachable but
    /// produced no table, or the table emptied out during cleaning.
    pub fn is_no_data(&self) -> bool {
        matches!(self, WisataError::NoTable(_) | WisataError::EmptyDataset)
    }
}

pub type Result<T> = std::result::Result<T, WisataError>;
