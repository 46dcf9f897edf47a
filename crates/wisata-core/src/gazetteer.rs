//! Static place-name centroids used for coordinate lookup.

/// A named centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

const fn centroid(name: &'static str, latitude: f64, longitude: f64) -> Centroid {
    Centroid {
        name,
        latitude,
        longitude,
    }
}

/// One centroid per first-level administrative region (province).
pub static REGIONS: [Centroid; 34] = [
    centroid("Aceh", 5.2, 96.0),
    centroid("Sumatera Utara", 2.5, 99.0),
    centroid("Sumatera Barat", -0.5, 100.5),
    centroid("Riau", 0.25, 101.5),
    centroid("Jambi", -1.5, 102.7),
    centroid("Sumatera Selatan", -3.2, 104.7),
    centroid("Bengkulu", -3.8, 102.1),
    centroid("Lampung", -4.5, 105.3),
    centroid("Kepulauan Bangka Belitung", -2.7, 107.6),
    centroid("Kepulauan Riau", 0.8, 101.7),
    centroid("DKI Jakarta", -6.2, 106.8),
    centroid("Jawa Barat", -6.9, 107.5),
    centroid("Jawa Tengah", -7.5, 110.4),
    centroid("Daerah Istimewa Yogyakarta", -7.8, 110.4),
    centroid("Jawa Timur", -7.3, 112.8),
    centroid("Banten", -6.3, 106.2),
    centroid("Bali", -8.7, 115.2),
    centroid("Nusa Tenggara Barat", -8.5, 117.3),
    centroid("Nusa Tenggara Timur", -8.7, 121.0),
    centroid("Kalimantan Barat", 0.0, 111.5),
    centroid("Kalimantan Tengah", -1.7, 113.3),
    centroid("Kalimantan Selatan", -3.5, 114.7),
    centroid("Kalimantan Timur", 0.5, 116.5),
    centroid("Kalimantan Utara", 4.0, 117.6),
    centroid("Sulawesi Utara", 1.5, 124.7),
    centroid("Sulawesi Tengah", -1.5, 120.8),
    centroid("Sulawesi Selatan", -5.5, 120.0),
    centroid("Sulawesi Tenggara", -4.3, 122.5),
    centroid("Gorontalo", 0.7, 122.5),
    centroid("Sulawesi Barat", -2.1, 119.3),
    centroid("Maluku", -3.2, 129.2),
    centroid("Maluku Utara", 2.0, 128.0),
    centroid("Papua", -4.5, 138.2),
    centroid("Papua Barat", -1.9, 131.3),
];

/// Well-known cities and destinations, finer than a region.
pub static PLACES: [Centroid; 19] = [
    centroid("Bali", -8.6705, 115.2126),
    centroid("Yogyakarta", -7.7956, 110.3688),
    centroid("Bandung", -6.9147, 107.6098),
    centroid("Jakarta", -6.2088, 106.8456),
    centroid("Surabaya", -7.2575, 112.7521),
    centroid("Malang", -7.9827, 112.6345),
    centroid("Medan", 3.5952, 98.6722),
    centroid("Pekanbaru", 0.5271, 101.4489),
    centroid("Makassar", -5.1477, 119.4327),
    centroid("Semarang", -6.9702, 110.4203),
    centroid("Palembang", -2.9081, 104.7549),
    centroid("Banjarmasin", -3.3243, 114.5971),
    centroid("Pontianak", -0.0263, 109.3425),
    centroid("Samarinda", -0.4917, 117.1431),
    centroid("Manado", 1.4748, 124.8244),
    centroid("Kendari", -3.9701, 122.5137),
    centroid("Ambon", -3.6959, 128.1814),
    centroid("Jayapura", -2.5243, 140.6869),
    centroid("Kupang", -10.1698, 123.6231),
];

/// Regions ordered longest name first, so "Maluku Utara" is tried before
/// "Maluku". Equal lengths keep table order.
pub fn regions_by_specificity() -> Vec<&'static Centroid> {
    let mut regions: Vec<&'static Centroid> = REGIONS.iter().collect();
    regions.sort_by(|a, b| b.name.len().cmp(&a.name.len()));
    regions
}

fn find_in<'a>(
    candidates: impl IntoIterator<Item = &'a Centroid>,
    text: &str,
) -> Option<&'a Centroid> {
    let lowered = text.to_lowercase();
    candidates
        .into_iter()
        .find(|c| lowered.contains(&c.name.to_lowercase()))
}

/// First place whose name occurs in `text` (case-insensitive).
pub fn find_place(text: &str) -> Option<&'static Centroid> {
    find_in(PLACES.iter(), text)
}

/// Most specific region whose name occurs in `text` (case-insensitive).
pub fn find_region(text: &str) -> Option<&'static Centroid> {
    find_in(regions_by_specificity(), text)
}
