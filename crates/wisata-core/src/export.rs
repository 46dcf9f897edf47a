//! Pass-through writers for a cleaned dataset.

use csv::Writer;
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::{Cell, Dataset, Result, WisataError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "json" => Ok(ExportFormat::Json),
            _ => Err(WisataError::UnsupportedFile(format!(
                "cannot export to '{}', use .csv, .xlsx or .json",
                path.display()
            ))),
        }
    }
}

fn write_csv_to<W: Write>(dataset: &Dataset, mut out: W) -> Result<W> {
    out.write_all(UTF8_BOM)?;
    let mut writer = Writer::from_writer(out);
    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row.cells().iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| WisataError::Io(e.into_error()))
}

/// CSV bytes with a UTF-8 byte-order mark, ready for download.
pub fn to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    write_csv_to(dataset, Vec::new())
}

pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    write_csv_to(dataset, File::create(path)?)?;
    Ok(())
}

fn build_workbook(dataset: &Dataset) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in dataset.columns().iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }
    for (idx, row) in dataset.rows().enumerate() {
        let line = idx as u32 + 1;
        for (col, cell) in row.cells().iter().enumerate() {
            match cell {
                Cell::Number(n) => {
                    worksheet.write_number(line, col as u16, *n)?;
                }
                Cell::Text(s) => {
                    worksheet.write_string(line, col as u16, s)?;
                }
                Cell::Missing => {}
            }
        }
    }
    Ok(workbook)
}

/// Workbook bytes with a single sheet; missing cells stay blank.
pub fn to_xlsx_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    Ok(build_workbook(dataset)?.save_to_buffer()?)
}

pub fn write_xlsx(dataset: &Dataset, path: &Path) -> Result<()> {
    build_workbook(dataset)?.save(path)?;
    Ok(())
}

pub fn write_json(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, dataset)?;
    Ok(())
}

/// Write `dataset` in the format implied by the file extension.
pub fn export(dataset: &Dataset, path: &Path) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    match format {
        ExportFormat::Csv => write_csv(dataset, path)?,
        ExportFormat::Xlsx => write_xlsx(dataset, path)?,
        ExportFormat::Json => write_json(dataset, path)?,
    }
    info!("Saved {} rows to {}", dataset.len(), path.display());
    Ok(format)
}
