use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};
use wisata_core::{RawTable, Result, WisataError};

use crate::extract::parse_delimited_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Workbook,
}

impl FileKind {
    /// Decide by extension, ignoring case: `.csv`, `.xlsx` or `.xls`.
    pub fn from_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" | "xls" => Ok(FileKind::Workbook),
            _ => Err(WisataError::UnsupportedFile(format!(
                "'{}' is not a .csv, .xlsx or .xls file",
                name
            ))),
        }
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// First worksheet, first row as header.
pub fn read_workbook(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| WisataError::Parse(e.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| WisataError::Parse("workbook has no worksheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| WisataError::Parse(e.to_string()))?;
    debug!("Reading worksheet '{}' ({} rows)", sheet, range.height());

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();

    let mut table = RawTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_to_string).collect())?;
    }
    Ok(table)
}

/// Turn an uploaded file into a raw table.
pub fn read_upload(name: &str, bytes: &[u8]) -> Result<RawTable> {
    let table = match FileKind::from_name(name)? {
        FileKind::Csv => parse_delimited_text(&String::from_utf8_lossy(bytes), b',')?,
        FileKind::Workbook => read_workbook(bytes)?,
    };
    info!(
        "Loaded {}: {} rows x {} columns",
        name,
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}
