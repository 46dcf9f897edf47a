use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fake::faker::address::en::{CityName, StateName};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use wisata_core::gazetteer::{PLACES, REGIONS};
use wisata_core::{clean_table, AccuracyReport, RawTable};
use wisata_scrapers::{extract_table, Page};

const PREFIXES: [&str; 6] = ["Pantai", "Gunung", "Candi", "Museum", "Danau", "Taman"];

// Helper function to generate a raw scraped table with foreign headers
fn generate_fake_table(count: usize) -> RawTable {
    let mut rng = rand::thread_rng();
    let mut table = RawTable::new(
        ["Destination", "Province", "City", "Stars", "Ticket Price", "Description"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );

    for _ in 0..count {
        let prefix = PREFIXES.choose(&mut rng).copied().unwrap_or("Pantai");
        let place: String = CityName().fake();
        // Half the rows name a known region, the rest something the gazetteers never heard of.
        let province = if rng.gen_bool(0.5) {
            REGIONS.choose(&mut rng).map(|r| r.name.to_string()).unwrap_or_default()
        } else {
            StateName().fake()
        };
        let city = if rng.gen_bool(0.3) {
            PLACES.choose(&mut rng).map(|p| p.name.to_string()).unwrap_or_default()
        } else {
            String::new()
        };
        let description: String = Sentence(3..12).fake();
        table
            .push_row(vec![
                format!("{} {}", prefix, place),
                province,
                city,
                format!("{:.1}", rng.gen_range(-1.0..7.0)),
                rng.gen_range(-5000..150000).to_string(),
                description,
            ])
            .unwrap();
    }
    table
}

fn generate_html_page(table: &RawTable) -> String {
    let mut html = String::from("<html><body><table><thead><tr>");
    for header in &table.headers {
        html.push_str(&format!("<th>{}</th>", header));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></body></html>");
    html
}

fn bench_cleaning(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleaning");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    for size in [100, 1000, 3000].iter() {
        group.bench_with_input(BenchmarkId::new("clean_table", size), size, |b, &size| {
            let table = generate_fake_table(size);
            b.iter(|| black_box(clean_table(table.clone())));
        });
    }

    for size in [100, 1000, 3000].iter() {
        group.bench_with_input(BenchmarkId::new("accuracy_report", size), size, |b, &size| {
            let (dataset, _) = clean_table(generate_fake_table(size)).unwrap();
            b.iter(|| black_box(AccuracyReport::from_dataset(&dataset)));
        });
    }

    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    group.sample_size(10);

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("html_table", size), size, |b, &size| {
            let html = generate_html_page(&generate_fake_table(size));
            b.iter(|| {
                let page = Page::new(&html, "text/html", "https://example.com/wisata");
                black_box(extract_table(&page))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cleaning, bench_extraction);
criterion_main!(benches);
