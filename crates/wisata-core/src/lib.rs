mod error;
mod dataset;
pub mod columns;
pub mod synthetic;
pub mod gazetteer;
pub mod coords;
pub mod clean;
pub mod report;
pub mod export;
mod display;

pub use error::{Result, WisataError};
pub use dataset::{parse_number, title_case, Cell, Dataset, RawTable, Row, RowCap, MISSING_TOKENS};
pub use columns::{map_columns, ColumnRename, STANDARD_COLUMNS};
pub use synthetic::{create_synthetic_columns, Category};
pub use coords::{resolve_coordinates, CoordinateReport};
pub use clean::{clean_dataset, clean_table, CleanReport};
pub use report::{AccuracyReport, DatasetStatistics, QualityBand};
pub use export::{export, to_csv_bytes, to_xlsx_bytes, ExportFormat};
pub use display::{
    create_completeness_table, create_preview_table, format_quality_score, truncate_description,
    PreviewRow,
};
