use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wisata_core::columns::KATEGORI;
use wisata_core::{
    create_completeness_table, create_preview_table, export, format_quality_score, title_case,
    AccuracyReport, DatasetStatistics, RowCap, WisataError,
};
use wisata_scrapers::{load_file, Origin, RetryPolicy, Scraped, TourismScraper};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise (-v, --verbose)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape tourism data from a web page or a delimited file URL
    #[command(about = "Scrape tourism data from a URL")]
    #[command(long_about = "Retrieve a URL, extract the first usable table (delimited text, HTML table or card list) and clean it into the standard tourism columns.")]
    Scrape(ScrapeCommand),

    /// Import a local csv/xlsx/xls file
    #[command(about = "Import tourism data from a csv, xlsx or xls file")]
    #[command(long_about = "Read a local csv, xlsx or xls file and run it through the same cleaning pipeline as scraped data.")]
    Import(ImportCommand),
}

#[derive(Parser)]
struct ScrapeCommand {
    /// Page or file to retrieve, http:// or https:// only (-u, --url)
    #[arg(short = 'u', long)]
    url: String,

    /// Number of retrieval attempts (-a, --attempts)
    #[arg(short = 'a', long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=10))]
    attempts: u32,

    /// Pause between attempts in seconds
    #[arg(long, default_value_t = 2)]
    retry_delay_secs: u64,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser)]
struct ImportCommand {
    /// File to import (-f, --file)
    #[arg(short = 'f', long)]
    file: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Keep at most this many rows, 10 to 3000 (-m, --max-rows)
    #[arg(short = 'm', long, default_value_t = RowCap::DEFAULT)]
    max_rows: usize,

    /// Write the cleaned data to .csv, .xlsx or .json (-o, --output)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Rows shown in the preview table (-p, --preview)
    #[arg(short = 'p', long, default_value_t = 10)]
    preview: usize,

    /// Only preview rows of this category (-c, --category)
    #[arg(short = 'c', long)]
    category: Option<String>,

    /// Print the accuracy report and dataset statistics (-r, --report)
    #[arg(short = 'r', long)]
    report: bool,
}

fn failure_hint(err: &WisataError) -> &'static str {
    match err {
        WisataError::Retrieval { .. } => "The source could not be reached. Check the URL or try again later.",
        WisataError::NoTable(_) => "The source was reached, but it holds no table, list or delimited data.",
        WisataError::EmptyDataset => "Data was extracted, but no usable rows were left after cleaning.",
        WisataError::InvalidSource(_) => "Use a URL starting with http:// or https://.",
        WisataError::UnsupportedFile(_) => "Supported files are .csv, .xlsx and .xls.",
        _ => "The pipeline stopped with an error.",
    }
}

fn print_report(scraped: &Scraped) {
    let accuracy = AccuracyReport::from_dataset(&scraped.dataset);
    println!("\n{}", "Data completeness".bold());
    println!("{}", create_completeness_table(&accuracy));
    println!("Quality score: {}", format_quality_score(&accuracy));

    let stats = DatasetStatistics::from_dataset(&scraped.dataset);
    println!("\n{}", "Statistics".bold());
    println!("Records: {}, columns: {}", stats.total_records, stats.columns);
    if !stats.kategori_distribution.is_empty() {
        println!("Categories:");
        for (kategori, count) in stats.kategori_distribution.iter().take(10) {
            println!("  {:<24} {}", kategori, count);
        }
    }
    if !stats.provinsi_distribution.is_empty() {
        println!("Provinces:");
        for (provinsi, count) in stats.provinsi_distribution.iter().take(10) {
            println!("  {:<24} {}", provinsi, count);
        }
    }
    if let Some(rating) = &stats.rating_stats {
        println!(
            "Rating: avg {:.2}, min {:.1}, max {:.1}, median {:.1}",
            rating.avg, rating.min, rating.max, rating.median
        );
    }
    if let Some(coords) = &stats.coordinate_validation {
        println!(
            "Coordinates: {}/{} valid ({:.1}%)",
            coords.valid, coords.total, coords.valid_percentage
        );
    }

    let clean = &scraped.report;
    println!(
        "Cleaning: {} -> {} rows, {} duplicate(s), {} rating(s) and {} price(s) out of range",
        clean.rows_in, clean.rows_out, clean.duplicates_removed, clean.ratings_discarded, clean.prices_discarded
    );
}

fn present(mut scraped: Scraped, cap: RowCap, args: &OutputArgs) -> Result<()> {
    let dropped = cap.apply(&mut scraped.dataset);
    if dropped > 0 {
        info!("Row cap {} dropped {} row(s)", cap.get(), dropped);
    }

    let source = match &scraped.origin {
        Origin::Url { url, strategy } => format!("{} ({})", url, strategy),
        Origin::File { name } => name.clone(),
    };
    println!(
        "{} {} rows x {} columns from {}",
        "Loaded".green().bold(),
        scraped.dataset.len(),
        scraped.dataset.width(),
        source
    );
    for warning in &scraped.warnings {
        warn!("{}", warning);
    }

    let wanted = args.category.as_deref().map(|c| title_case(c.trim()));
    let rows = scraped.dataset.rows().filter(|row| match &wanted {
        Some(wanted) => row
            .get(KATEGORI)
            .is_some_and(|k| title_case(k.to_string().trim()) == *wanted),
        None => true,
    });
    println!("{}", create_preview_table(rows.take(args.preview)));

    if !scraped.dataset.has_plottable_rows() {
        println!("{}", "No rows have valid coordinates to place on a map.".yellow());
    }

    if args.report {
        print_report(&scraped);
    }

    if let Some(path) = &args.output {
        let format = export(&scraped.dataset, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved {:?} to {}", format, path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let output = match &cli.command {
        Commands::Scrape(cmd) => &cmd.output,
        Commands::Import(cmd) => &cmd.output,
    };
    let cap = RowCap::new(output.max_rows)?;

    let outcome = match &cli.command {
        Commands::Scrape(cmd) => {
            let policy = RetryPolicy {
                max_attempts: cmd.attempts,
                delay: Duration::from_secs(cmd.retry_delay_secs),
                ..RetryPolicy::default()
            };
            TourismScraper::new(policy).scrape_url(&cmd.url).await
        }
        Commands::Import(cmd) => {
            let bytes = std::fs::read(&cmd.file)
                .with_context(|| format!("Failed to read {}", cmd.file.display()))?;
            let name = cmd
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| cmd.file.display().to_string());
            load_file(&name, &bytes)
        }
    };

    match outcome {
        Ok(scraped) => present(scraped, cap, output),
        Err(err) => {
            eprintln!("{}", failure_hint(&err).red().bold());
            Err(err.into())
        }
    }
}
