//! Layered table extraction.
//!
//! Strategies run in a fixed order and the first one that yields a
//! non-empty table wins. A strategy that fails to parse is logged and
//! skipped; it never aborts the extraction.

use csv::ReaderBuilder;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use tracing::{debug, info, warn};
use url::Url;
use wisata_core::{RawTable, Result, WisataError};

/// Markup tables need at least this many body rows and columns.
pub const MIN_TABLE_ROWS: usize = 3;
pub const MIN_TABLE_COLUMNS: usize = 2;

const MAX_COLSPAN: usize = 100;

/// Containers tried, in order, by the card strategy.
pub const CARD_SELECTORS: [&str; 6] = [
    "div.item",
    "div.card",
    "div.product",
    "article",
    "li.item",
    "li.result",
];

const CARD_FIELDS: &str = "p, span, a, h2, h3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Delimited,
    StructuredTable,
    GenericTable,
    Cards,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Delimited => write!(f, "delimited text"),
            Strategy::StructuredTable => write!(f, "structured table"),
            Strategy::GenericTable => write!(f, "generic table"),
            Strategy::Cards => write!(f, "card list"),
        }
    }
}

/// Content handed to the extractor.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub content: &'a str,
    pub content_type: &'a str,
    pub url: &'a str,
}

impl<'a> Page<'a> {
    pub fn new(content: &'a str, content_type: &'a str, url: &'a str) -> Self {
        Self {
            content,
            content_type,
            url,
        }
    }

    /// Lowercased URL path, or the whole URL when it does not parse.
    fn path(&self) -> String {
        Url::parse(self.url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| self.url.to_string())
            .to_lowercase()
    }

    fn is_tab_separated(&self) -> bool {
        self.content_type.contains("tab-separated") || self.path().ends_with(".tsv")
    }

    fn is_delimited(&self) -> bool {
        self.content_type.contains("csv") || self.path().ends_with(".csv") || self.is_tab_separated()
    }
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub found: Option<(Strategy, RawTable)>,
    /// Parse failures of strategies that were tried and skipped.
    pub warnings: Vec<String>,
}

impl Extraction {
    pub fn strategy(&self) -> Option<Strategy> {
        self.found.as_ref().map(|(s, _)| *s)
    }

    pub fn into_table(self) -> Option<RawTable> {
        self.found.map(|(_, table)| table)
    }
}

type StrategyFn = fn(&Page<'_>) -> Result<Option<RawTable>>;

const STRATEGIES: [(Strategy, StrategyFn); 4] = [
    (Strategy::Delimited, delimited),
    (Strategy::StructuredTable, structured_table),
    (Strategy::GenericTable, generic_table),
    (Strategy::Cards, cards),
];

pub fn extract_table(page: &Page<'_>) -> Extraction {
    let mut extraction = Extraction::default();

    for (strategy, run) in STRATEGIES {
        debug!("Trying {} strategy", strategy);
        match run(page) {
            Ok(Some(table)) if !table.is_empty() => {
                info!(
                    "{} strategy found {} rows x {} columns",
                    strategy,
                    table.row_count(),
                    table.column_count()
                );
                extraction.found = Some((strategy, table));
                return extraction;
            }
            Ok(_) => debug!("{} strategy found nothing", strategy),
            Err(e) => {
                warn!("{} strategy failed: {}", strategy, e);
                extraction.warnings.push(format!("{}: {}", strategy, e));
            }
        }
    }

    info!("No table found in {}", page.url);
    extraction
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| WisataError::Parse(e.to_string()))
}

fn meets_minimum_shape(table: &RawTable) -> bool {
    table.row_count() >= MIN_TABLE_ROWS && table.column_count() >= MIN_TABLE_COLUMNS
}

fn is_named(element: &ElementRef<'_>, name: &str) -> bool {
    element.value().name() == name
}

fn has_ancestor(element: &ElementRef<'_>, name: &str) -> bool {
    element
        .ancestors()
        .any(|n| n.value().as_element().is_some_and(|e| e.name() == name))
}

fn delimited(page: &Page<'_>) -> Result<Option<RawTable>> {
    if !page.is_delimited() {
        return Ok(None);
    }
    let delimiter = if page.is_tab_separated() { b'\t' } else { b',' };
    parse_delimited_text(page.content, delimiter).map(Some)
}

/// Parse comma- or tab-separated text; the first record is the header.
pub fn parse_delimited_text(content: &str, delimiter: u8) -> Result<RawTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(WisataError::Parse("no header row".to_string()));
    }

    let mut table = RawTable::new(headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(str::to_string).collect())?;
    }
    Ok(table)
}

fn collapse_whitespace(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn stripped_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Presentation-only tables and tables wrapping other tables.
fn is_layout_table(table: &ElementRef<'_>, tables: &Selector) -> bool {
    let role = table.value().attr("role").map(|r| r.to_lowercase());
    if matches!(role.as_deref(), Some("presentation") | Some("none")) {
        return true;
    }
    table.select(tables).any(|inner| inner.id() != table.id())
}

/// Cells of one row with `colspan` expanded.
fn expanded_cells(row: &ElementRef<'_>, cells: &Selector) -> Vec<(String, bool)> {
    let mut out = Vec::new();
    for cell in row.select(cells) {
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN);
        let text = collapse_whitespace(&cell);
        let is_header = is_named(&cell, "th");
        for _ in 0..span {
            out.push((text.clone(), is_header));
        }
    }
    out
}

fn read_structured_table(table: &ElementRef<'_>, rows: &Selector, cells: &Selector) -> Result<RawTable> {
    let mut header: Option<Vec<String>> = None;
    let mut body: Vec<Vec<(String, bool)>> = Vec::new();

    for row in table.select(rows) {
        let row_cells = expanded_cells(&row, cells);
        if row_cells.is_empty() {
            continue;
        }
        if has_ancestor(&row, "thead") {
            header = Some(row_cells.into_iter().map(|(text, _)| text).collect());
        } else {
            body.push(row_cells);
        }
    }

    if header.is_none() && body.first().is_some_and(|r| r.iter().all(|(_, th)| *th)) {
        header = Some(body.remove(0).into_iter().map(|(text, _)| text).collect());
    }

    let width = body
        .iter()
        .map(Vec::len)
        .chain(header.iter().map(Vec::len))
        .max()
        .unwrap_or(0);
    let mut headers = header.unwrap_or_default();
    headers.resize(width, String::new());

    let mut raw = RawTable::new(headers);
    for row in body {
        raw.push_row(row.into_iter().map(|(text, _)| text).collect())?;
    }
    Ok(raw)
}

/// Every data table in the document; the largest one meeting the minimum
/// shape wins, earlier tables winning ties.
fn structured_table(page: &Page<'_>) -> Result<Option<RawTable>> {
    let document = Html::parse_document(page.content);
    let tables = parse_selector("table")?;
    let rows = parse_selector("tr")?;
    let cells = parse_selector("th, td")?;

    let mut best: Option<RawTable> = None;
    for (index, table) in document.select(&tables).enumerate() {
        if is_layout_table(&table, &tables) {
            debug!("Skipping layout table #{}", index);
            continue;
        }
        let raw = read_structured_table(&table, &rows, &cells)?;
        debug!(
            "Table #{}: {} rows x {} columns",
            index,
            raw.row_count(),
            raw.column_count()
        );
        if !meets_minimum_shape(&raw) {
            continue;
        }
        if best.as_ref().map_or(true, |b| raw.row_count() > b.row_count()) {
            best = Some(raw);
        }
    }
    Ok(best)
}

/// Walk the first table of the document by hand.
fn generic_table(page: &Page<'_>) -> Result<Option<RawTable>> {
    let document = Html::parse_document(page.content);
    let Some(table) = document.select(&parse_selector("table")?).next() else {
        return Ok(None);
    };
    let thead = parse_selector("thead")?;
    let tbody = parse_selector("tbody")?;
    let rows = parse_selector("tr")?;
    let cells = parse_selector("th, td")?;
    let header_cells = parse_selector("th")?;

    let head = table.select(&thead).next();
    let headers: Vec<String> = match head {
        Some(head) => head.select(&header_cells).map(|th| stripped_text(&th)).collect(),
        None => table
            .select(&rows)
            .next()
            .map(|first| first.select(&cells).map(|c| stripped_text(&c)).collect())
            .unwrap_or_default(),
    };
    if headers.is_empty() {
        return Ok(None);
    }

    let body = table.select(&tbody).next().unwrap_or(table);
    let skip = if head.is_some() { 0 } else { 1 };
    let mut raw = RawTable::new(headers);
    for row in body.select(&rows).skip(skip) {
        let values: Vec<String> = row.select(&cells).map(|c| stripped_text(&c)).collect();
        if !values.is_empty() {
            raw.push_row(values)?;
        }
    }

    Ok(meets_minimum_shape(&raw).then_some(raw))
}

/// Repeating containers turned into rows keyed by the tag of each field.
fn cards(page: &Page<'_>) -> Result<Option<RawTable>> {
    let document = Html::parse_document(page.content);
    let fields = parse_selector(CARD_FIELDS)?;

    for css in CARD_SELECTORS {
        let container = parse_selector(css)?;
        let mut records: Vec<Vec<(String, String)>> = Vec::new();

        for item in document.select(&container) {
            let mut record: Vec<(String, String)> = Vec::new();
            for field in item.select(&fields) {
                let text = stripped_text(&field);
                if text.is_empty() {
                    continue;
                }
                let tag = field.value().name().to_string();
                match record.iter_mut().find(|(name, _)| *name == tag) {
                    Some((_, value)) => *value = text,
                    None => record.push((tag, text)),
                }
            }
            if !record.is_empty() {
                records.push(record);
            }
        }

        if records.is_empty() {
            continue;
        }
        debug!("Selector '{}' matched {} cards", css, records.len());

        let mut columns: Vec<String> = Vec::new();
        for (name, _) in records.iter().flatten() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        let mut raw = RawTable::new(columns.clone());
        for record in records {
            let row = columns
                .iter()
                .map(|c| {
                    record
                        .iter()
                        .find(|(name, _)| name == c)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default()
                })
                .collect();
            raw.push_row(row)?;
        }
        return Ok(Some(raw));
    }
    Ok(None)
}
