use std::fs;
use tempfile::tempdir;
use wisata_core::{clean_table, export, ExportFormat, RawTable};
use wisata_scrapers::load_file;

fn cleaned() -> wisata_core::Dataset {
    let mut raw = RawTable::new(vec![
        "Destination".to_string(),
        "Province".to_string(),
        "Price".to_string(),
    ]);
    for row in [
        ["Pantai Pangandaran", "Jawa Barat", "15000"],
        ["Museum Fatahillah", "DKI Jakarta", "5000"],
        ["Taman Nasional Komodo", "Nusa Tenggara Timur", ""],
    ] {
        raw.push_row(row.iter().map(|s| s.to_string()).collect()).unwrap();
    }
    clean_table(raw).unwrap().0
}

#[test]
fn test_export_to_csv_with_bom() {
    let temp_dir = tempdir().unwrap();
    let export_path = temp_dir.path().join("wisata.csv");

    let dataset = cleaned();
    assert_eq!(export(&dataset, &export_path).unwrap(), ExportFormat::Csv);

    let bytes = fs::read(&export_path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let content = String::from_utf8_lossy(&bytes);
    assert!(content.contains("Museum Fatahillah"));
    assert!(content.lines().next().unwrap().contains("nama,provinsi,harga"));

    // A saved file can be imported again without losing rows or columns.
    let reloaded = load_file("wisata.csv", &bytes).unwrap();
    assert_eq!(reloaded.dataset.len(), dataset.len());
    let mut before = dataset.columns().to_vec();
    let mut after = reloaded.dataset.columns().to_vec();
    before.sort();
    after.sort();
    assert_eq!(before, after);
    assert!(reloaded.report.column_mapping.is_empty());
}

#[test]
fn test_export_to_workbook_and_json() {
    let temp_dir = tempdir().unwrap();
    let dataset = cleaned();

    let xlsx_path = temp_dir.path().join("wisata.xlsx");
    assert_eq!(export(&dataset, &xlsx_path).unwrap(), ExportFormat::Xlsx);
    let reloaded = load_file("wisata.xlsx", &fs::read(&xlsx_path).unwrap()).unwrap();
    assert_eq!(reloaded.dataset.len(), 3);

    let json_path = temp_dir.path().join("wisata.json");
    assert_eq!(export(&dataset, &json_path).unwrap(), ExportFormat::Json);
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2]["harga"], serde_json::Value::Null);
    assert_eq!(records[0]["kategori"], "Beach");
}

#[test]
fn test_export_rejects_unknown_extension() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("wisata.parquet");
    assert!(export(&cleaned(), &path).is_err());
    assert!(!path.exists());
}
