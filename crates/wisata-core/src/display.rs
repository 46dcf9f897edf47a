use colored::{ColoredString, Colorize};
use tabled::settings::{object::Columns, Modify, Style, Width};
use tabled::{Table, Tabled};

use crate::columns::{DESKRIPSI, HARGA, KATEGORI, KOTA, LATITUDE, LONGITUDE, NAMA, PROVINSI, RATING};
use crate::dataset::{title_case, Row};
use crate::report::{AccuracyReport, QualityBand};

const DESCRIPTION_LIMIT: usize = 100;

#[derive(Tabled)]
pub struct PreviewRow {
    #[tabled(rename = "Nama")]
    pub nama: String,
    #[tabled(rename = "Provinsi")]
    pub provinsi: String,
    #[tabled(rename = "Kota")]
    pub kota: String,
    #[tabled(rename = "Kategori")]
    pub kategori: String,
    #[tabled(rename = "Rating", display_with = "display_right_6")]
    pub rating: String,
    #[tabled(rename = "Harga", display_with = "display_right_10")]
    pub harga: String,
    #[tabled(rename = "Koordinat")]
    pub koordinat: String,
    #[tabled(rename = "Deskripsi")]
    pub deskripsi: String,
}

fn display_right_6(s: &str) -> String {
    format!("{:>6}", s)
}

fn display_right_10(s: &str) -> String {
    format!("{:>10}", s)
}

/// Cut `text` to `limit` characters, marking the cut with "...".
pub fn truncate_description(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn text_or_na(row: &Row<'_>, column: &str) -> String {
    row.get(column)
        .filter(|c| !c.is_missing())
        .map(|c| c.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

impl PreviewRow {
    pub fn from_row(row: &Row<'_>) -> Self {
        let koordinat = match (row.number(LATITUDE), row.number(LONGITUDE)) {
            (Some(lat), Some(lon)) => format!("{:.4}, {:.4}", lat, lon),
            _ => "N/A".to_string(),
        };
        let kategori = row
            .get(KATEGORI)
            .filter(|c| !c.is_missing())
            .map(|c| title_case(c.to_string().trim()))
            .unwrap_or_else(|| "N/A".to_string());
        let deskripsi = row
            .text(DESKRIPSI)
            .map(|d| truncate_description(d, DESCRIPTION_LIMIT))
            .unwrap_or_default();

        Self {
            nama: text_or_na(row, NAMA),
            provinsi: text_or_na(row, PROVINSI),
            kota: text_or_na(row, KOTA),
            kategori,
            rating: row
                .number(RATING)
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "N/A".to_string()),
            harga: row
                .number(HARGA)
                .map(|h| format!("{:.0}", h))
                .unwrap_or_else(|| "N/A".to_string()),
            koordinat,
            deskripsi,
        }
    }
}

pub fn create_preview_table<'a>(rows: impl IntoIterator<Item = Row<'a>>) -> String {
    let table_rows: Vec<PreviewRow> = rows.into_iter().map(|r| PreviewRow::from_row(&r)).collect();

    let mut table = Table::new(&table_rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(0)).with(Width::truncate(40)))     // Nama
        .with(Modify::new(Columns::single(1)).with(Width::truncate(24)))     // Provinsi
        .with(Modify::new(Columns::single(2)).with(Width::truncate(20)))     // Kota
        .with(Modify::new(Columns::single(7)).with(Width::wrap(50)));        // Deskripsi

    table.to_string()
}

#[derive(Tabled)]
pub struct CompletenessRow {
    #[tabled(rename = "Column")]
    pub column: String,
    #[tabled(rename = "Filled", display_with = "display_right_6")]
    pub filled: String,
    #[tabled(rename = "Missing", display_with = "display_right_6")]
    pub missing: String,
    #[tabled(rename = "Complete", display_with = "display_right_10")]
    pub percent: String,
}

pub fn create_completeness_table(report: &AccuracyReport) -> String {
    let rows: Vec<CompletenessRow> = report
        .completeness_by_column
        .iter()
        .map(|c| CompletenessRow {
            column: c.column.clone(),
            filled: c.filled.to_string(),
            missing: c.missing.to_string(),
            percent: format!("{:.2}%", c.completeness_percent),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.to_string()
}

/// Quality score coloured by band: green, yellow or red.
pub fn format_quality_score(report: &AccuracyReport) -> ColoredString {
    let text = format!("{:.1}% ({})", report.data_quality_score, report.band());
    match report.band() {
        QualityBand::Good => text.green().bold(),
        QualityBand::Fair => text.yellow().bold(),
        QualityBand::Poor => text.red().bold(),
    }
}
