//! Structured summary of a run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cache::write_atomic;
use crate::error::{Result, ScanError};
use crate::pdf::{AssemblyResult, AssemblyStatus};
use crate::scans::{DownloadResult, DownloadStatus};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub boreholes: usize,
    pub export: Option<PathBuf>,
    pub downloads: Vec<DownloadResult>,
    pub pdfs: Vec<AssemblyResult>,
}

/// Counts per outcome, for logging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub downloaded: usize,
    pub cached: usize,
    pub unavailable: usize,
    pub download_failures: usize,
    pub pdfs_written: usize,
    pub pdfs_existing: usize,
    pub pdfs_without_images: usize,
    pub pdf_failures: usize,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            boreholes: 0,
            export: None,
            downloads: Vec::new(),
            pdfs: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for d in &self.downloads {
            match d.status {
                DownloadStatus::Downloaded { .. } => summary.downloaded += 1,
                DownloadStatus::Cached => summary.cached += 1,
                DownloadStatus::MissingUrl | DownloadStatus::Unavailable { .. } => {
                    summary.unavailable += 1
                }
                DownloadStatus::Failed { .. } => summary.download_failures += 1,
            }
        }
        for p in &self.pdfs {
            match p.status {
                AssemblyStatus::Written { .. } => summary.pdfs_written += 1,
                AssemblyStatus::Exists => summary.pdfs_existing += 1,
                AssemblyStatus::NoImages => summary.pdfs_without_images += 1,
                AssemblyStatus::Failed { .. } => summary.pdf_failures += 1,
            }
        }
        summary
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_vec_pretty(self).map_err(ScanError::Report)?;
        write_atomic(path, &data).map_err(|source| ScanError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
