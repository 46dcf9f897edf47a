mod export;

use mockito::Server;
use std::time::Duration;
use wisata_core::columns::{KATEGORI, LATITUDE, LONGITUDE, NAMA, PROVINSI, RATING};
use wisata_core::coords::is_valid_pair;
use wisata_core::{to_xlsx_bytes, AccuracyReport, Cell, Dataset, WisataError};
use wisata_scrapers::{load_file, Origin, RetryPolicy, Strategy, TourismScraper};

const DESTINATION_PAGE: &str = r#"<html>
<head><title>Destinasi Wisata Indonesia</title></head>
<body>
  <table role="presentation"><tr><td>Beranda</td><td>Kontak</td></tr></table>
  <table class="wikitable">
    <thead>
      <tr><th>Nama Destinasi</th><th>Province</th><th>Stars</th><th>Ticket Price</th><th>Keterangan</th></tr>
    </thead>
    <tbody>
      <tr><td>Pantai Kuta</td><td>Bali</td><td>4.6</td><td>0</td><td>Pantai berpasir putih</td></tr>
      <tr><td>Gunung Bromo</td><td>Jawa Timur</td><td>4.8</td><td>29000</td><td>Matahari terbit</td></tr>
      <tr><td>Candi Borobudur</td><td>Jawa Tengah</td><td>9.5</td><td>50000</td><td>N/A</td></tr>
      <tr><td>Pantai Kuta</td><td>Bali</td><td>4.1</td><td>0</td><td>Duplikat</td></tr>
      <tr><td>Danau Toba</td><td>Sumatera Utara</td><td>4.5</td><td>-10</td><td></td></tr>
      <tr><td>Pulau Morotai</td><td>Maluku Utara</td><td></td><td></td><td></td></tr>
    </tbody>
  </table>
</body>
</html>"#;

fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts: attempts,
        delay: Duration::ZERO,
        ..RetryPolicy::default()
    }
}

fn assert_pipeline_invariants(dataset: &Dataset) {
    for row in dataset.rows() {
        let (lat, lon) = (row.number(LATITUDE), row.number(LONGITUDE));
        assert_eq!(lat.is_some(), lon.is_some(), "partial coordinates in {:?}", row.cells());
        if lat.is_some() {
            assert!(is_valid_pair(lat, lon));
        }
        if let Some(rating) = row.number(RATING) {
            assert!((0.0..=5.0).contains(&rating));
        }
        if let Some(price) = row.number("harga") {
            assert!(price >= 0.0);
        }
    }
}

#[tokio::test]
async fn test_scrape_html_destination_table() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/destinasi")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(DESTINATION_PAGE)
        .expect(1)
        .create_async()
        .await;

    let scraper = TourismScraper::new(fast_policy(3));
    let scraped = scraper
        .scrape_url(&format!("{}/destinasi", server.url()))
        .await
        .unwrap();
    mock.assert_async().await;

    assert!(matches!(
        scraped.origin,
        Origin::Url { strategy: Strategy::StructuredTable, .. }
    ));
    let dataset = &scraped.dataset;
    assert_eq!(dataset.len(), 5);
    for column in [NAMA, PROVINSI, "kota", KATEGORI, RATING, "harga", "deskripsi", LATITUDE, LONGITUDE] {
        assert!(dataset.has_column(column), "missing column {}", column);
    }
    assert_pipeline_invariants(dataset);

    let kuta = dataset.row(0).unwrap();
    assert_eq!(kuta.text(KATEGORI), Some("Beach"));
    assert_eq!((kuta.number(LATITUDE), kuta.number(LONGITUDE)), (Some(-8.6705), Some(115.2126)));

    let bromo = dataset.row(1).unwrap();
    assert_eq!(bromo.text(KATEGORI), Some("Mountain"));
    assert_eq!(bromo.text("kota"), Some("Jawa Timur"));

    let borobudur = dataset.row(2).unwrap();
    assert_eq!(borobudur.number(RATING), None);
    assert_eq!(borobudur.get("deskripsi"), Some(&Cell::Missing));

    let toba = dataset.row(3).unwrap();
    assert_eq!(toba.number("harga"), None);

    let morotai = dataset.row(4).unwrap();
    assert_eq!(morotai.number(LATITUDE), Some(2.0));

    assert_eq!(scraped.report.duplicates_removed, 1);
    assert_eq!(scraped.report.ratings_discarded, 1);
    assert_eq!(scraped.report.prices_discarded, 1);

    let accuracy = AccuracyReport::from_dataset(dataset);
    assert_eq!(accuracy.completeness(NAMA).unwrap().completeness_percent, 100.0);
    assert_eq!(accuracy.completeness(RATING).unwrap().filled, 3);
    assert!(dataset.has_plottable_rows());
}

#[tokio::test]
async fn test_unreachable_source_uses_whole_retry_budget() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/down")
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let err = TourismScraper::new(fast_policy(3))
        .scrape_url(&format!("{}/down", server.url()))
        .await
        .unwrap_err();
    mock.assert_async().await;

    assert!(matches!(err, WisataError::Retrieval { attempts: 3, .. }));
    assert!(!err.is_no_data());
}

#[tokio::test]
async fn test_reachable_source_without_table() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body><h1>Halaman kosong</h1></body></html>")
        .create_async()
        .await;

    let err = TourismScraper::new(fast_policy(3))
        .scrape_url(&server.url())
        .await
        .unwrap_err();
    assert!(matches!(err, WisataError::NoTable(_)));
    assert!(err.is_no_data());
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_retrieval() {
    let err = TourismScraper::new(fast_policy(3))
        .scrape_url("file:///etc/passwd")
        .await
        .unwrap_err();
    assert!(matches!(err, WisataError::InvalidSource(_)));
}

#[test]
fn test_workbook_upload_goes_through_cleaner() {
    let mut sheet = Dataset::new(["Attraction Name", "Region", "Category"]);
    sheet.push_record(vec![Cell::text("Tanah Lot"), Cell::text("Bali"), Cell::text("temple")]);
    sheet.push_record(vec![Cell::text(" Kawah Ijen "), Cell::text("Jawa Timur"), Cell::text("mountain")]);
    sheet.push_record(vec![Cell::Missing, Cell::Missing, Cell::Missing]);
    let bytes = to_xlsx_bytes(&sheet).unwrap();

    let scraped = load_file("destinasi.xlsx", &bytes).unwrap();
    let dataset = &scraped.dataset;
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.row(1).unwrap().text(NAMA), Some("Kawah Ijen"));
    assert_eq!(dataset.row(0).unwrap().text(KATEGORI), Some("temple"));
    assert_pipeline_invariants(dataset);
}

#[test]
fn test_unsupported_upload() {
    let err = load_file("destinasi.json", b"[]").unwrap_err();
    assert!(matches!(err, WisataError::UnsupportedFile(_)));
}
