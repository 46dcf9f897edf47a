use serde::Serialize;
use std::fmt;

use crate::columns::{KATEGORI, LATITUDE, LONGITUDE, NAMA, PROVINSI, RATING};
use crate::dataset::title_case;
use crate::Dataset;

/// Weight of each column in the overall quality score.
pub const QUALITY_WEIGHTS: [(&str, f64); 6] = [
    (NAMA, 0.20),
    (PROVINSI, 0.20),
    (KATEGORI, 0.15),
    (RATING, 0.15),
    (LATITUDE, 0.15),
    (LONGITUDE, 0.15),
];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCompleteness {
    pub column: String,
    pub completeness_percent: f64,
    pub filled: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub total_rows: usize,
    pub completeness_by_column: Vec<ColumnCompleteness>,
    pub data_quality_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityBand {
    Good,
    Fair,
    Poor,
}

impl QualityBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            QualityBand::Good
        } else if score >= 60.0 {
            QualityBand::Fair
        } else {
            QualityBand::Poor
        }
    }
}

impl fmt::Display for QualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityBand::Good => write!(f, "Good"),
            QualityBand::Fair => write!(f, "Fair"),
            QualityBand::Poor => write!(f, "Poor"),
        }
    }
}

impl AccuracyReport {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let total = dataset.len();
        let completeness_by_column: Vec<ColumnCompleteness> = dataset
            .columns()
            .iter()
            .map(|column| {
                let filled = dataset.count_filled(column).unwrap_or(0);
                ColumnCompleteness {
                    column: column.clone(),
                    completeness_percent: round2(percent(filled, total)),
                    filled,
                    missing: total - filled,
                }
            })
            .collect();

        let score = QUALITY_WEIGHTS
            .iter()
            .filter_map(|(column, weight)| {
                completeness_by_column
                    .iter()
                    .find(|c| c.column == *column)
                    .map(|c| c.completeness_percent * weight)
            })
            .sum::<f64>();

        Self {
            total_rows: total,
            completeness_by_column,
            data_quality_score: round2(score),
        }
    }

    pub fn completeness(&self, column: &str) -> Option<&ColumnCompleteness> {
        self.completeness_by_column.iter().find(|c| c.column == column)
    }

    pub fn band(&self) -> QualityBand {
        QualityBand::from_score(self.data_quality_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateValidation {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub valid_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStatistics {
    pub total_records: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub missing_values: Vec<(String, usize)>,
    pub kategori_distribution: Vec<(String, usize)>,
    pub provinsi_distribution: Vec<(String, usize)>,
    pub rating_stats: Option<RatingStats>,
    pub coordinate_validation: Option<CoordinateValidation>,
}

/// Count present values, most frequent first; ties keep first-seen order.
fn value_counts(values: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn rating_stats(dataset: &Dataset) -> Option<RatingStats> {
    let mut ratings: Vec<f64> = dataset.column(RATING)?.filter_map(|c| c.as_number()).collect();
    if ratings.is_empty() {
        return None;
    }
    ratings.sort_by(|a, b| a.total_cmp(b));
    let n = ratings.len();
    let median = if n % 2 == 1 {
        ratings[n / 2]
    } else {
        (ratings[n / 2 - 1] + ratings[n / 2]) / 2.0
    };
    Some(RatingStats {
        avg: ratings.iter().sum::<f64>() / n as f64,
        min: ratings[0],
        max: ratings[n - 1],
        median,
    })
}

impl DatasetStatistics {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let missing_values = dataset
            .columns()
            .iter()
            .map(|c| (c.clone(), dataset.len() - dataset.count_filled(c).unwrap_or(0)))
            .collect();

        let kategori_distribution = dataset
            .column(KATEGORI)
            .map(|cells| {
                value_counts(
                    cells
                        .filter(|c| !c.is_missing())
                        .map(|c| title_case(c.to_string().trim())),
                )
            })
            .unwrap_or_default();

        let provinsi_distribution = dataset
            .column(PROVINSI)
            .map(|cells| value_counts(cells.filter(|c| !c.is_missing()).map(|c| c.to_string())))
            .unwrap_or_default();

        let coordinate_validation = (dataset.has_column(LATITUDE) && dataset.has_column(LONGITUDE))
            .then(|| {
                let valid = dataset.valid_coordinates().iter().filter(|v| **v).count();
                CoordinateValidation {
                    total: dataset.len(),
                    valid,
                    invalid: dataset.len() - valid,
                    valid_percentage: percent(valid, dataset.len()),
                }
            });

        Self {
            total_records: dataset.len(),
            columns: dataset.width(),
            column_names: dataset.columns().to_vec(),
            missing_values,
            kategori_distribution,
            provinsi_distribution,
            rating_stats: rating_stats(dataset),
            coordinate_validation,
        }
    }
}
