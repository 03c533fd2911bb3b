//! Borehole scan scraper.
//!
//! Reads a polygon of easting/northing points, downloads the scanned
//! records of every borehole inside it and writes one PDF per borehole.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use borescan::index::load_points_polygon;
use borescan::pipeline::{self, PipelineOptions};
use borescan::resolver::Resolver;
use borescan::scans::ScanClient;
use borescan::Config;

#[derive(Parser, Debug)]
#[command(name = "scrape")]
#[command(about = "Download BGS borehole scans inside a polygon and assemble PDFs")]
struct Args {
    /// CSV of polygon vertices with "X (Easting)" and "Y (Northing)" columns
    /// (as exported by gridreferencefinder.com). Prompted for if omitted.
    #[arg(short, long)]
    points: Option<PathBuf>,

    /// Directory for PDFs and the borehole CSV. Prompted for if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Borehole dataset, overrides the configured path
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Cache directory for manifests and page images, overrides the configured paths
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Borehole ids as a JSON string or list of strings. Validated only;
    /// lookup by id is not available.
    #[arg(long, conflicts_with = "points")]
    ids: Option<String>,

    /// Download images without building PDFs
    #[arg(long)]
    no_pdf: bool,

    /// Write a JSON report of every download and PDF to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(dataset) = &args.dataset {
        config.dataset.path = dataset.clone();
    }
    if let Some(cache_dir) = &args.cache_dir {
        config.cache.manifest_dir = cache_dir.clone();
        config.cache.scratch_dir = cache_dir.clone();
    }

    let client = ScanClient::new(&config.provider).context("Failed to create HTTP client")?;

    if let Some(ids) = &args.ids {
        let value: serde_json::Value =
            serde_json::from_str(ids).context("--ids must be JSON, e.g. '[\"123\", \"456\"]'")?;
        Resolver::new(&config, &client).from_ids(&value).await?;
        return Ok(());
    }

    let points = match args.points {
        Some(p) => p,
        None => prompt_path("Select csv input file from Gridreferencefinder")?,
    };
    let output_dir = match args.output {
        Some(p) => p,
        None => prompt_path("Select output folder")?,
    };

    info!("Borescan");
    info!("Points: {}", points.display());
    info!("Output: {}", output_dir.display());
    info!("Dataset: {}", config.dataset.path.display());

    let polygon = load_points_polygon(&points)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let mut options = PipelineOptions::new(&output_dir);
    options.assemble_pdfs = !args.no_pdf;

    let report = pipeline::run(&config, &client, polygon, &options, &pb).await?;

    let summary = report.summary();
    info!(
        "Boreholes: {} | images downloaded: {}, cached: {}, unavailable: {}, failed: {}",
        report.boreholes,
        summary.downloaded,
        summary.cached,
        summary.unavailable,
        summary.download_failures
    );
    if options.assemble_pdfs {
        info!(
            "PDFs written: {}, already present: {}, without images: {}, failed: {}",
            summary.pdfs_written,
            summary.pdfs_existing,
            summary.pdfs_without_images,
            summary.pdf_failures
        );
    }
    if summary.download_failures > 0 || summary.pdf_failures > 0 {
        warn!("Some boreholes could not be completed, see log above");
    }

    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!("Report written to {}", path.display());
    }

    info!("Download complete");
    Ok(())
}

/// Ask for a path on stdin
fn prompt_path(message: &str) -> Result<PathBuf> {
    let mut stdout = io::stdout();
    write!(stdout, "{}: ", message)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    let line = line.trim();
    if line.is_empty() {
        anyhow::bail!("No path given for: {}", message);
    }
    Ok(PathBuf::from(line))
}
