//! The cleaning pipeline: raw text table in, standardized dataset out.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::columns::{self, ColumnRename, HARGA, NAMA, PROVINSI, RATING};
use crate::coords::{self, CoordinateReport};
use crate::dataset::MISSING_TOKENS;
use crate::synthetic;
use crate::{Cell, Dataset, RawTable, Result, WisataError};

/// What each cleaning stage did to the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_in: usize,
    pub columns_out: usize,
    pub empty_rows_dropped: usize,
    pub empty_columns_dropped: usize,
    pub renamed_headers: Vec<ColumnRename>,
    pub column_mapping: Vec<ColumnRename>,
    pub synthesized: Vec<String>,
    pub coordinates: CoordinateReport,
    pub ratings_discarded: usize,
    pub prices_discarded: usize,
    pub duplicates_removed: usize,
}

/// Run the full pipeline over a freshly extracted table.
pub fn clean_table(raw: RawTable) -> Result<(Dataset, CleanReport)> {
    clean_dataset(Dataset::from_raw(raw))
}

pub fn clean_dataset(mut dataset: Dataset) -> Result<(Dataset, CleanReport)> {
    let mut report = CleanReport {
        rows_in: dataset.len(),
        columns_in: dataset.width(),
        ..CleanReport::default()
    };
    info!(
        "Cleaning {} rows x {} columns",
        report.rows_in, report.columns_in
    );
    if dataset.is_empty() {
        warn!("Nothing to clean: the table has no rows");
        return Err(WisataError::EmptyDataset);
    }

    let (columns_dropped, rows_dropped) = drop_empty(&mut dataset);
    report.empty_columns_dropped = columns_dropped;
    report.empty_rows_dropped = rows_dropped;

    report.renamed_headers = normalize_headers(&mut dataset);
    normalize_cells(&mut dataset);

    // Cells holding only missing-value tokens are blank now.
    let (columns_dropped, rows_dropped) = drop_empty(&mut dataset);
    report.empty_columns_dropped += columns_dropped;
    report.empty_rows_dropped += rows_dropped;
    if dataset.is_empty() {
        warn!("Every row was empty");
        return Err(WisataError::EmptyDataset);
    }

    report.column_mapping = columns::map_columns(&mut dataset);
    report.synthesized = synthetic::create_synthetic_columns(&mut dataset);
    report.coordinates = coords::resolve_coordinates(&mut dataset);

    report.ratings_discarded = validate_range(&mut dataset, RATING, |v| (0.0..=5.0).contains(&v));
    report.prices_discarded = validate_range(&mut dataset, HARGA, |v| v >= 0.0);
    report.duplicates_removed = drop_duplicates(&mut dataset);

    report.rows_out = dataset.len();
    report.columns_out = dataset.width();
    info!(
        "Data cleaned: {} rows x {} columns",
        report.rows_out, report.columns_out
    );

    if dataset.is_empty() {
        warn!("No rows left after cleaning");
        return Err(WisataError::EmptyDataset);
    }
    Ok((dataset, report))
}

/// Drop columns and then rows that hold nothing but blanks.
pub fn drop_empty(dataset: &mut Dataset) -> (usize, usize) {
    // Headers may still repeat here, so columns are addressed by position.
    let keep: Vec<bool> = (0..dataset.width())
        .map(|col| {
            dataset
                .column_at(col)
                .is_some_and(|mut cells| cells.any(|c| !c.is_blank()))
        })
        .collect();
    let columns_dropped = keep.iter().filter(|k| !**k).count();
    dataset.retain_columns(&keep);

    let before = dataset.len();
    dataset.retain_records(|row| row.cells().iter().any(|c| !c.is_blank()));
    let rows_dropped = before - dataset.len();

    if columns_dropped > 0 || rows_dropped > 0 {
        debug!(
            "Dropped {} empty column(s) and {} empty row(s)",
            columns_dropped, rows_dropped
        );
    }
    (columns_dropped, rows_dropped)
}

fn control_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n\t]").expect("valid whitespace pattern"))
}

/// Trim header names, fold line breaks and tabs into spaces, name blank
/// headers and suffix colliding names with their occurrence index.
pub fn normalize_headers(dataset: &mut Dataset) -> Vec<ColumnRename> {
    let mut names: Vec<String> = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = control_whitespace().replace_all(name.trim(), " ").into_owned();
            if name.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                name
            }
        })
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicated: Vec<String> = Vec::new();
    for name in &names {
        if !seen.insert(name.as_str()) && !duplicated.contains(name) {
            duplicated.push(name.clone());
        }
    }

    for dup in &duplicated {
        warn!("Duplicate column renamed: {}", dup);
        let mut occurrence = 0;
        for idx in 0..names.len() {
            if &names[idx] != dup {
                continue;
            }
            let mut candidate = format!("{}_{}", dup, occurrence);
            while names.contains(&candidate) {
                occurrence += 1;
                candidate = format!("{}_{}", dup, occurrence);
            }
            names[idx] = candidate;
            occurrence += 1;
        }
    }

    let renamed = dataset
        .columns()
        .iter()
        .zip(&names)
        .filter(|(old, new)| old != new)
        .map(|(old, new)| ColumnRename {
            from: old.clone(),
            to: new.clone(),
        })
        .collect();
    dataset.set_columns(names);
    renamed
}

/// Trim text cells and turn the missing-value tokens into `Missing`.
pub fn normalize_cells(dataset: &mut Dataset) {
    dataset.map_cells(|cell| match cell {
        Cell::Text(text) => {
            let trimmed = text.trim();
            if MISSING_TOKENS.contains(&trimmed) {
                Cell::Missing
            } else {
                Cell::Text(trimmed.to_string())
            }
        }
        other => other.clone(),
    });
}

/// Coerce a column to numbers; values failing `valid` become missing.
/// Returns how many present values were discarded as out of range.
pub fn validate_range<F>(dataset: &mut Dataset, column: &str, valid: F) -> usize
where
    F: Fn(f64) -> bool,
{
    let mut discarded = 0;
    let present = dataset.map_column(column, |cell| match cell.as_number() {
        Some(value) if valid(value) => Cell::Number(value),
        Some(_) => {
            discarded += 1;
            Cell::Missing
        }
        None => Cell::Missing,
    });
    if present {
        debug!(
            "Column '{}' validated: {} valid values, {} out of range",
            column,
            dataset.count_filled(column).unwrap_or(0),
            discarded
        );
    }
    discarded
}

/// Drop later rows repeating an earlier (nama, provinsi) pair.
pub fn drop_duplicates(dataset: &mut Dataset) -> usize {
    if !(dataset.has_column(NAMA) && dataset.has_column(PROVINSI)) {
        return 0;
    }
    let before = dataset.len();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    dataset.retain_records(|row| {
        let key = |column: &str| match row.get(column) {
            Some(Cell::Missing) | None => "\u{0}".to_string(),
            Some(cell) => cell.to_string(),
        };
        seen.insert((key(NAMA), key(PROVINSI)))
    });
    let removed = before - dataset.len();
    if removed > 0 {
        info!("Removed {} duplicate record(s)", removed);
    }
    removed
}
