//! Page image downloads into the scratch cache.

use indicatif::ProgressBar;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

use super::Fetch;
use crate::cache::write_atomic;
use crate::config::Config;
use crate::error::{Result, ScanError};
use crate::models::{PageUrl, ScanRow, ScanTable};

/// Suffix the image endpoint expects after a manifest URL
const IMAGE_SUFFIX: &str = ".png";

/// What happened to one row of the scan table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadStatus {
    Downloaded { bytes: usize },
    /// Scratch file already present, no request issued
    Cached,
    /// Borehole has no manifest entry
    MissingUrl,
    /// Manifest carries a marker instead of a URL
    Unavailable { reason: String },
    /// Image fetched but could not be written
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub bgs_id: i64,
    pub regno: String,
    pub page: Option<u32>,
    #[serde(flatten)]
    pub status: DownloadStatus,
}

/// Fetches page images one at a time into the scratch directory.
pub struct Downloader<'a, F> {
    fetch: &'a F,
    scratch_dir: PathBuf,
    placeholder_host: String,
    public_host: String,
}

impl<'a, F: Fetch> Downloader<'a, F> {
    pub fn new(fetch: &'a F, config: &Config) -> Result<Self> {
        Ok(Self {
            fetch,
            scratch_dir: config.cache.scratch_dir.clone(),
            placeholder_host: config.provider.placeholder_host.clone(),
            public_host: config.public_host()?,
        })
    }

    /// Image URL for a manifest URL: placeholder host rewritten, suffix appended
    pub fn image_url(&self, url: &str) -> String {
        let url = url.trim();
        let url = if !self.placeholder_host.is_empty() && url.contains(&self.placeholder_host) {
            url.replace(&self.placeholder_host, &self.public_host)
        } else {
            url.to_string()
        };
        format!("{}{}", url, IMAGE_SUFFIX)
    }

    /// Download every row of `table` in order.
    ///
    /// Write failures are recorded per row; a network error stops the batch.
    pub async fn download_all(
        &self,
        table: &ScanTable,
        progress: &ProgressBar,
    ) -> Result<Vec<DownloadResult>> {
        fs::create_dir_all(&self.scratch_dir).map_err(|source| ScanError::FileWrite {
            path: self.scratch_dir.clone(),
            source,
        })?;

        progress.set_length(table.len() as u64);
        let mut results = Vec::with_capacity(table.len());

        for row in table.rows() {
            let status = self.download(row).await?;
            progress.inc(1);
            results.push(DownloadResult {
                bgs_id: row.bgs_id,
                regno: row.regno.clone(),
                page: row.page,
                status,
            });
        }

        let fetched = results
            .iter()
            .filter(|r| matches!(r.status, DownloadStatus::Downloaded { .. }))
            .count();
        info!("Downloaded {} of {} page image(s)", fetched, results.len());
        Ok(results)
    }

    /// Download a single row unless it is unusable or already cached
    pub async fn download(&self, row: &ScanRow) -> Result<DownloadStatus> {
        let (url, name) = match (&row.url, row.image_name()) {
            (Some(PageUrl::Link(url)), Some(name)) => (url, name),
            (Some(marker), Some(_)) => {
                debug!("Skipping {} page {:?}: {}", row.regno, row.page, marker);
                return Ok(DownloadStatus::Unavailable {
                    reason: marker.to_string(),
                });
            }
            _ => return Ok(DownloadStatus::MissingUrl),
        };

        let target = self.scratch_dir.join(name);
        if target.is_file() {
            return Ok(DownloadStatus::Cached);
        }

        let image_url = self.image_url(url);
        info!("Downloading : {}", image_url);
        let bytes = self.fetch.get_bytes(&image_url).await?;

        match write_atomic(&target, &bytes) {
            Ok(()) => Ok(DownloadStatus::Downloaded { bytes: bytes.len() }),
            Err(e) => {
                error!(
                    "could not save image for BH {} - {:?}: {}",
                    row.regno, row.page, e
                );
                Ok(DownloadStatus::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scans::testing::RecordingFetch;

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.cache.scratch_dir = dir.join("scratch");
        config
    }

    fn row(regno: &str, page: u32, url: PageUrl) -> ScanRow {
        ScanRow {
            bgs_id: 1,
            regno: regno.to_string(),
            page: Some(page),
            url: Some(url),
        }
    }

    #[test]
    fn test_placeholder_host_rewritten() {
        let config = Config::default();
        let fetch = RecordingFetch::new();
        let downloader = Downloader::new(&fetch, &config).unwrap();

        assert_eq!(
            downloader.image_url("http://localhost:8080/sobi_scans/boreholes/1/images/1 "),
            "http://scans.bgs.ac.uk/sobi_scans/boreholes/1/images/1.png"
        );
        assert_eq!(
            downloader.image_url("http://scans.bgs.ac.uk/sobi_scans/boreholes/1/images/1"),
            "http://scans.bgs.ac.uk/sobi_scans/boreholes/1/images/1.png"
        );
    }

    #[tokio::test]
    async fn test_downloads_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let fetch =
            RecordingFetch::new().respond("http://scans.bgs.ac.uk/a/1.png", vec![1u8, 2, 3]);
        let downloader = Downloader::new(&fetch, &config).unwrap();

        let table = ScanTable::new(vec![
            row("SK51NW/1", 1, PageUrl::Link("http://scans.bgs.ac.uk/a/1".into())),
            row("SK51NW/1", 2, PageUrl::Confidential),
            ScanRow {
                bgs_id: 2,
                regno: "SK51NW/2".into(),
                page: None,
                url: None,
            },
        ]);

        let results = downloader
            .download_all(&table, &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(results[0].status, DownloadStatus::Downloaded { bytes: 3 });
        assert!(matches!(results[1].status, DownloadStatus::Unavailable { .. }));
        assert_eq!(results[2].status, DownloadStatus::MissingUrl);
        assert_eq!(fetch.request_count(), 1);
        assert_eq!(
            fs::read(config.cache.scratch_dir.join("SK51NW_1_1.png")).unwrap(),
            vec![1u8, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_existing_scratch_file_issues_no_request() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.cache.scratch_dir).unwrap();
        fs::write(config.cache.scratch_dir.join("TQ38SW1_1.png"), b"old").unwrap();

        let fetch = RecordingFetch::new();
        let downloader = Downloader::new(&fetch, &config).unwrap();
        let status = downloader
            .download(&row("TQ38SW1", 1, PageUrl::Link("http://scans.bgs.ac.uk/b/1".into())))
            .await
            .unwrap();

        assert_eq!(status, DownloadStatus::Cached);
        assert_eq!(fetch.request_count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        // A directory squatting on the target name makes the write fail
        fs::create_dir_all(config.cache.scratch_dir.join("BAD_1.png")).unwrap();

        let fetch = RecordingFetch::new();
        let downloader = Downloader::new(&fetch, &config).unwrap();
        let table = ScanTable::new(vec![
            row("BAD", 1, PageUrl::Link("http://scans.bgs.ac.uk/bad/1".into())),
            row("GOOD", 1, PageUrl::Link("http://scans.bgs.ac.uk/good/1".into())),
        ]);

        let results = downloader
            .download_all(&table, &ProgressBar::hidden())
            .await
            .unwrap();

        assert!(matches!(results[0].status, DownloadStatus::Failed { .. }));
        assert!(matches!(results[1].status, DownloadStatus::Downloaded { .. }));
        assert!(config.cache.scratch_dir.join("GOOD_1.png").is_file());
    }

    #[tokio::test]
    async fn test_network_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let fetch = RecordingFetch::new().fail("http://scans.bgs.ac.uk/x/1.png");
        let downloader = Downloader::new(&fetch, &config).unwrap();

        let result = downloader
            .download(&row("X", 1, PageUrl::Link("http://scans.bgs.ac.uk/x/1".into())))
            .await;
        assert!(result.is_err());
        assert!(!config.cache.scratch_dir.join("X_1.png").exists());
    }
}
