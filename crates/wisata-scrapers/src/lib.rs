pub mod extract;
pub mod retriever;
pub mod upload;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use url::Url;
use wisata_core::{clean_table, CleanReport, Dataset, Result, WisataError};

pub use extract::{extract_table, Extraction, Page, Strategy};
pub use retriever::{Fetch, HttpFetcher, RawResponse, Retriever, RetryPolicy, USER_AGENTS};
pub use upload::{read_upload, FileKind};

/// Where a dataset came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    Url { url: String, strategy: Strategy },
    File { name: String },
}

/// A cleaned dataset plus everything the pipeline learned on the way.
#[derive(Debug, Clone)]
pub struct Scraped {
    pub dataset: Dataset,
    pub report: CleanReport,
    pub origin: Origin,
    pub warnings: Vec<String>,
    pub retrieved_at: DateTime<Utc>,
}

/// Accept only absolute http(s) URLs.
pub fn validate_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    // Schemes come back lowercased from the parser.
    let url = Url::parse(trimmed).map_err(|e| {
        WisataError::InvalidSource(format!("'{}' is not a valid URL: {}", trimmed, e))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WisataError::InvalidSource(format!(
            "URL must use http:// or https://, got {}://",
            other
        ))),
    }
}

/// Retrieve, extract and clean tourism data from a URL or an uploaded file.
pub struct TourismScraper<F: Fetch = HttpFetcher> {
    retriever: Retriever<F>,
}

impl TourismScraper<HttpFetcher> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            retriever: Retriever::new(policy),
        }
    }
}

impl Default for TourismScraper<HttpFetcher> {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<F: Fetch> TourismScraper<F> {
    pub fn with_fetcher(fetcher: F, policy: RetryPolicy) -> Self {
        Self {
            retriever: Retriever::with_fetcher(fetcher, policy),
        }
    }

    pub async fn scrape_url(&self, raw_url: &str) -> Result<Scraped> {
        let url = validate_url(raw_url)?;
        info!("Starting scrape from {}", url);

        let response = self.retriever.retrieve(url.as_str()).await?;
        let extraction = extract_table(&Page::new(
            response.text(),
            &response.content_type,
            url.as_str(),
        ));
        let warnings = extraction.warnings;

        let Some((strategy, table)) = extraction.found else {
            let reason = if warnings.is_empty() {
                format!("no table, list or delimited data in {}", url)
            } else {
                format!("no usable table in {} ({})", url, warnings.join("; "))
            };
            return Err(WisataError::NoTable(reason));
        };

        let (dataset, report) = clean_table(table)?;
        info!("Scrape finished: {} rows via {}", dataset.len(), strategy);
        Ok(Scraped {
            dataset,
            report,
            origin: Origin::Url {
                url: url.to_string(),
                strategy,
            },
            warnings,
            retrieved_at: response.retrieved_at,
        })
    }
}

/// Ingest an uploaded csv/xlsx/xls file and run it through the cleaner.
pub fn load_file(name: &str, bytes: &[u8]) -> Result<Scraped> {
    let table = read_upload(name, bytes)?;
    if table.is_empty() {
        warn!("{} holds no rows", name);
    }
    let (dataset, report) = clean_table(table)?;
    Ok(Scraped {
        dataset,
        report,
        origin: Origin::File {
            name: name.to_string(),
        },
        warnings: Vec::new(),
        retrieved_at: Utc::now(),
    })
}
