//! Polygon in, PDFs out.
//!
//! Resolve boreholes, download their page images, assemble PDFs and export
//! the matched set. Every step runs sequentially.

use geo::Polygon;
use indicatif::ProgressBar;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, ScanError};
use crate::export::write_boreholes_csv;
use crate::pdf::Assembler;
use crate::report::RunReport;
use crate::resolver::Resolver;
use crate::scans::{Downloader, Fetch};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    /// Build PDFs after downloading (on by default)
    pub assemble_pdfs: bool,
}

impl PipelineOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            assemble_pdfs: true,
        }
    }
}

pub async fn run<F: Fetch>(
    config: &Config,
    fetch: &F,
    polygon: Polygon<f64>,
    options: &PipelineOptions,
    progress: &ProgressBar,
) -> Result<RunReport> {
    let mut report = RunReport::start();

    fs::create_dir_all(&options.output_dir).map_err(|source| ScanError::FileWrite {
        path: options.output_dir.clone(),
        source,
    })?;

    let resolution = Resolver::new(config, fetch).from_polygon(polygon).await?;
    report.boreholes = resolution.boreholes.len();

    let downloader = Downloader::new(fetch, config)?;
    report.downloads = downloader.download_all(&resolution.scans, progress).await?;
    progress.finish_and_clear();

    if options.assemble_pdfs {
        let assembler = Assembler::new(&config.cache.scratch_dir, &options.output_dir);
        report.pdfs = assembler.assemble(&resolution.scans)?;
    }

    report.export = Some(write_boreholes_csv(
        &resolution.boreholes,
        &options.output_dir,
    )?);

    report.finish();
    info!("Run summary: {:?}", report.summary());
    Ok(report)
}
