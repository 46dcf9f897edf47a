use serde::Serialize;
use tracing::{debug, info, warn};

use crate::columns::{LATITUDE, LONGITUDE};
use crate::dataset::Row;
use crate::gazetteer::{self, Centroid};
use crate::{Cell, Dataset};

/// Column names (lowercased) that may carry a place name.
pub const LOCATION_COLUMNS: [&str; 8] = [
    "provinsi", "kota", "lokasi", "nama", "destinasi", "province", "city", "location",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoordinateReport {
    pub already_valid: usize,
    pub resolved: usize,
    pub cleared: usize,
    pub unresolved: usize,
}

pub fn is_valid_latitude(value: f64) -> bool {
    (-90.0..=90.0).contains(&value)
}

pub fn is_valid_longitude(value: f64) -> bool {
    (-180.0..=180.0).contains(&value)
}

/// Both values present and within range.
pub fn is_valid_pair(latitude: Option<f64>, longitude: Option<f64>) -> bool {
    matches!(
        (latitude, longitude),
        (Some(lat), Some(lon)) if is_valid_latitude(lat) && is_valid_longitude(lon)
    )
}

/// Row-wise predicate used to pick plottable rows.
pub fn has_valid_coordinates(row: &Row<'_>) -> bool {
    is_valid_pair(row.number(LATITUDE), row.number(LONGITUDE))
}

impl Dataset {
    /// One flag per record: true when the record can be placed on a map.
    pub fn valid_coordinates(&self) -> Vec<bool> {
        self.rows().map(|row| has_valid_coordinates(&row)).collect()
    }

    pub fn has_plottable_rows(&self) -> bool {
        self.rows().any(|row| has_valid_coordinates(&row))
    }
}

/// Look a single text value up: place table first, then regions.
pub fn lookup(text: &str) -> Option<&'static Centroid> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    gazetteer::find_place(text).or_else(|| gazetteer::find_region(text))
}

/// Give every row without a valid coordinate pair a centroid from the
/// gazetteers. Rows that already hold valid coordinates are not touched;
/// rows that cannot be resolved end up with both coordinates missing.
pub fn resolve_coordinates(dataset: &mut Dataset) -> CoordinateReport {
    let mut report = CoordinateReport::default();

    for column in [LATITUDE, LONGITUDE] {
        if !dataset.has_column(column) {
            dataset.add_column_with(column, |_| Cell::Missing);
        }
        dataset.map_column(column, Cell::to_numeric);
    }

    let location_columns: Vec<String> = dataset
        .columns()
        .iter()
        .filter(|c| LOCATION_COLUMNS.contains(&c.to_lowercase().as_str()))
        .cloned()
        .collect();
    if location_columns.is_empty() {
        warn!("No location columns found, coordinates cannot be resolved");
    }

    for index in 0..dataset.len() {
        let Some(row) = dataset.row(index) else {
            continue;
        };
        if has_valid_coordinates(&row) {
            report.already_valid += 1;
            continue;
        }

        let found = location_columns.iter().find_map(|column| {
            row.get(column)
                .filter(|cell| !cell.is_missing())
                .and_then(|cell| lookup(&cell.to_string()))
        });
        let partially_filled = [LATITUDE, LONGITUDE]
            .iter()
            .any(|c| row.get(c).is_some_and(|cell| !cell.is_missing()));

        match found {
            Some(centroid) => {
                debug!("Row {} resolved to {}", index, centroid.name);
                dataset.set(index, LATITUDE, Cell::Number(centroid.latitude));
                dataset.set(index, LONGITUDE, Cell::Number(centroid.longitude));
                report.resolved += 1;
            }
            None => {
                if partially_filled {
                    dataset.set(index, LATITUDE, Cell::Missing);
                    dataset.set(index, LONGITUDE, Cell::Missing);
                    report.cleared += 1;
                }
                report.unresolved += 1;
            }
        }
    }

    info!(
        "Coordinates: {} resolved, {} already valid, {} unresolved",
        report.resolved, report.already_valid, report.unresolved
    );
    report
}
