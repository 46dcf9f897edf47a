use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::columns::{KATEGORI, KOTA, NAMA, PROVINSI, RATING};
use crate::{Cell, Dataset};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Beach,
    Mountain,
    Temple,
    Museum,
    City,
    Nature,
    Water,
    Attraction,
}

/// Keywords looked up in a place name, checked in this order.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Beach, &["beach", "pantai", "laut", "sea", "coast", "shore"]),
    (Category::Mountain, &["mountain", "gunung", "peak", "alpine", "hiking"]),
    (Category::Temple, &["temple", "candi", "shrine", "pagoda", "religious"]),
    (Category::Museum, &["museum", "gallery", "art", "historical"]),
    (Category::City, &["city", "kota", "town", "urban", "metropolitan"]),
    (Category::Nature, &["park", "forest", "nature", "hutan", "taman", "alam"]),
    (Category::Water, &["lake", "danau", "waterfall", "air terjun", "geyser"]),
];

impl Category {
    /// Infer a category from free text; falls back to `Attraction`.
    pub fn infer(text: &str) -> Category {
        let lowered = text.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Attraction)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Beach => write!(f, "Beach"),
            Category::Mountain => write!(f, "Mountain"),
            Category::Temple => write!(f, "Temple"),
            Category::Museum => write!(f, "Museum"),
            Category::City => write!(f, "City"),
            Category::Nature => write!(f, "Nature"),
            Category::Water => write!(f, "Water"),
            Category::Attraction => write!(f, "Attraction"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beach" | "pantai" => Ok(Category::Beach),
            "mountain" | "gunung" => Ok(Category::Mountain),
            "temple" | "candi" => Ok(Category::Temple),
            "museum" => Ok(Category::Museum),
            "city" | "kota" => Ok(Category::City),
            "nature" | "alam" => Ok(Category::Nature),
            "water" | "air" => Ok(Category::Water),
            "attraction" | "wisata" => Ok(Category::Attraction),
            _ => Err(format!(
                "Invalid category: {}. Valid options are: beach, mountain, temple, museum, city, nature, water, attraction",
                s
            )),
        }
    }
}

/// Fill in `kategori`, `rating` and `kota` when mapping left them absent.
/// Returns the names of the columns that were created.
pub fn create_synthetic_columns(dataset: &mut Dataset) -> Vec<String> {
    let mut created = Vec::new();

    if !dataset.has_column(KATEGORI) {
        let has_nama = dataset.has_column(NAMA);
        dataset.add_column_with(KATEGORI, |row| {
            let category = match row.text(NAMA) {
                Some(name) if has_nama => Category::infer(name),
                _ => Category::Attraction,
            };
            Cell::Text(category.to_string())
        });
        info!("Created '{}' column from place names", KATEGORI);
        created.push(KATEGORI.to_string());
    }

    if !dataset.has_column(RATING) {
        dataset.add_column_with(RATING, |_| Cell::Missing);
        info!("Created empty '{}' column", RATING);
        created.push(RATING.to_string());
    }

    if !dataset.has_column(KOTA) && dataset.has_column(PROVINSI) {
        dataset.add_column_with(KOTA, |row| {
            let city = row
                .get(PROVINSI)
                .filter(|cell| !cell.is_missing())
                .map(|cell| cell.to_string())
                .map(|text| text.split(',').next().unwrap_or_default().trim().to_string())
                .filter(|city| !city.is_empty());
            Cell::Text(city.unwrap_or_else(|| "Unknown".to_string()))
        });
        info!("Created '{}' column from '{}'", KOTA, PROVINSI);
        created.push(KOTA.to_string());
    }

    created
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_inference() {
        assert_eq!(Category::infer("Pantai Kuta"), Category::Beach);
        assert_eq!(Category::infer("Gunung Bromo"), Category::Mountain);
        assert_eq!(Category::infer("Candi Prambanan"), Category::Temple);
        assert_eq!(Category::infer("Air Terjun Sipiso-piso"), Category::Water);
        assert_eq!(Category::infer("Kraton"), Category::Attraction);
    }

    #[test]
    fn test_first_category_in_table_order_wins() {
        assert_eq!(Category::infer("Pantai Museum"), Category::Beach);
        // "Taman Kota" holds a city keyword and a nature keyword.
        assert_eq!(Category::infer("Taman Kota"), Category::City);
        assert_eq!(Category::infer("Art Market"), Category::Museum);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Pantai".parse::<Category>(), Ok(Category::Beach));
        assert_eq!(" WATER ".parse::<Category>(), Ok(Category::Water));
        assert!("volcano".parse::<Category>().is_err());
        assert_eq!(Category::Attraction.to_string(), "Attraction");
    }

    #[test]
    fn test_synthetic_columns_created() {
        let mut dataset = Dataset::new(["nama", "provinsi"]);
        dataset.push_record(vec![Cell::text("Pantai Kuta"), Cell::text("Bali, Indonesia")]);
        dataset.push_record(vec![Cell::text("Istana"), Cell::Missing]);

        let created = create_synthetic_columns(&mut dataset);
        assert_eq!(created, vec!["kategori", "rating", "kota"]);

        assert_eq!(dataset.get(0, "kategori"), Some(&Cell::text("Beach")));
        assert_eq!(dataset.get(1, "kategori"), Some(&Cell::text("Attraction")));
        assert_eq!(dataset.get(0, "rating"), Some(&Cell::Missing));
        assert_eq!(dataset.get(0, "kota"), Some(&Cell::text("Bali")));
        assert_eq!(dataset.get(1, "kota"), Some(&Cell::text("Unknown")));
    }

    #[test]
    fn test_existing_columns_are_kept() {
        let mut dataset = Dataset::new(["nama", "kategori", "rating"]);
        dataset.push_record(vec![Cell::text("Pantai Kuta"), Cell::text("Shopping"), Cell::text("4")]);

        let created = create_synthetic_columns(&mut dataset);
        assert!(created.is_empty());
        assert_eq!(dataset.get(0, "kategori"), Some(&Cell::text("Shopping")));
        assert!(!dataset.has_column("kota"));
    }

    #[test]
    fn test_without_nama_everything_is_an_attraction() {
        let mut dataset = Dataset::new(["judul"]);
        dataset.push_record(vec![Cell::text("Pantai Kuta")]);
        create_synthetic_columns(&mut dataset);
        assert_eq!(dataset.get(0, "kategori"), Some(&Cell::text("Attraction")));
    }
}
