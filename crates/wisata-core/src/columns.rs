//! Standard column vocabulary and the synonym table used to map foreign
//! column names onto it.

use serde::Serialize;
use tracing::{debug, info};

use crate::Dataset;

pub const NAMA: &str = "nama";
pub const PROVINSI: &str = "provinsi";
pub const KOTA: &str = "kota";
pub const KATEGORI: &str = "kategori";
pub const RATING: &str = "rating";
pub const HARGA: &str = "harga";
pub const DESKRIPSI: &str = "deskripsi";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";

pub const STANDARD_COLUMNS: [&str; 7] = [NAMA, PROVINSI, KOTA, KATEGORI, RATING, HARGA, DESKRIPSI];

/// Known synonyms per standard column, in matching priority order.
pub const COLUMN_SYNONYMS: &[(&str, &[&str])] = &[
    (
        NAMA,
        &[
            "name", "destinasi", "tempat", "lokasi", "wisata", "objek", "attraction",
            "title", "site name", "place", "destination", "nama tempat", "object",
            "attraction name", "site", "location name", "nama lokasi",
        ],
    ),
    (
        PROVINSI,
        &[
            "province", "provinsi", "state", "region", "daerah", "country",
            "negara", "country/region", "area", "province/state", "administrative region",
            "location", "wilayah", "negara/region", "state/region",
        ],
    ),
    (
        KOTA,
        &[
            "city", "kota", "kabupaten", "kab/kota", "kota/kab", "town",
            "municipality", "district", "kecamatan", "locality", "city/town",
            "kota/kabupaten",
        ],
    ),
    (
        KATEGORI,
        &[
            "category", "kategori", "tipe", "type", "jenis", "kind", "classification",
            "site category", "attraction type", "category type", "classification type",
            "kategori wisata", "jenis wisata",
        ],
    ),
    (
        RATING,
        &[
            "rating", "nilai", "score", "review", "rank", "rate", "stars",
            "elevation", "height", "grade", "nilai rating",
        ],
    ),
    (
        HARGA,
        &[
            "price", "harga", "biaya", "cost", "tarif", "admission", "fee",
            "entry fee", "entrance fee", "ticket price", "biaya masuk",
        ],
    ),
    (
        DESKRIPSI,
        &[
            "description", "deskripsi", "keterangan", "detail", "remarks",
            "notes", "info", "information", "catatan", "penjelasan", "info detail",
        ],
    ),
];

/// One applied rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

/// Whether a source column name matches one synonym: equal after
/// lowercasing, or containing a synonym longer than two characters.
pub fn matches_synonym(column: &str, synonym: &str) -> bool {
    let lowered = column.trim().to_lowercase();
    lowered == synonym || (synonym.len() > 2 && lowered.contains(synonym))
}

/// Plan the renames for `columns` without applying them.
pub fn plan_mapping(columns: &[String]) -> Vec<ColumnRename> {
    let mut renames: Vec<ColumnRename> = Vec::new();

    for (standard, synonyms) in COLUMN_SYNONYMS {
        if columns.iter().any(|c| c == standard) {
            continue;
        }
        let candidate = columns.iter().find(|column| {
            !STANDARD_COLUMNS.contains(&column.as_str())
                && !renames.iter().any(|r| &r.from == *column)
                && synonyms.iter().any(|syn| matches_synonym(column, syn))
        });
        if let Some(column) = candidate {
            debug!("Column '{}' matches standard column '{}'", column, standard);
            renames.push(ColumnRename {
                from: column.clone(),
                to: standard.to_string(),
            });
        }
    }

    renames
}

/// Rename source columns onto the standard vocabulary in place.
pub fn map_columns(dataset: &mut Dataset) -> Vec<ColumnRename> {
    let renames = plan_mapping(dataset.columns());
    for rename in &renames {
        dataset.rename_column(&rename.from, &rename.to);
    }
    if !renames.is_empty() {
        info!("Mapped {} column(s) onto the standard vocabulary", renames.len());
    }
    renames
}
