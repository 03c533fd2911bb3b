//! Per-borehole image manifests.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::Fetch;
use crate::cache::write_atomic;
use crate::config::Config;
use crate::error::{Result, ScanError};
use crate::models::{ManifestEntry, PageUrl};

/// Body line the service sends for boreholes it will not show
const NOT_FOUND_MESSAGE: &str = "the requested borehole does not exist";

/// Resolves and caches the page-image URLs of boreholes.
pub struct ManifestFetcher<'a, F> {
    fetch: &'a F,
    cache_dir: PathBuf,
    base_url: String,
}

impl<'a, F: Fetch> ManifestFetcher<'a, F> {
    pub fn new(fetch: &'a F, config: &Config) -> Self {
        Self {
            fetch,
            cache_dir: config.cache.manifest_dir.clone(),
            base_url: config.provider.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn cache_path(&self, bgs_id: i64) -> PathBuf {
        self.cache_dir.join(format!("{}_imgpath.json", bgs_id))
    }

    pub fn listing_url(&self, bgs_id: i64) -> String {
        format!("{}/sobi_scans/boreholes/{}/images", self.base_url, bgs_id)
    }

    /// Manifest for one borehole.
    ///
    /// A cached manifest is returned as stored; otherwise the listing is
    /// fetched once, parsed and written to the cache before returning.
    /// Network errors are propagated as-is.
    pub async fn manifest(&self, bgs_id: i64) -> Result<Vec<ManifestEntry>> {
        let path = self.cache_path(bgs_id);
        if path.is_file() {
            debug!("Using cached manifest {}", path.display());
            return load_cached(&path);
        }

        let body = self.fetch.get_text(&self.listing_url(bgs_id)).await?;
        let mut entries = parse_listing(bgs_id, &body);

        if entries.is_empty() {
            warn!("Borehole {} data is not available", bgs_id);
            entries.push(ManifestEntry {
                bgs_id,
                page: 1,
                url: PageUrl::InvalidLocation,
            });
        }

        fs::create_dir_all(&self.cache_dir).map_err(|source| ScanError::FileWrite {
            path: self.cache_dir.clone(),
            source,
        })?;
        let data = serde_json::to_vec_pretty(&entries).map_err(|source| ScanError::Manifest {
            path: path.clone(),
            source,
        })?;
        write_atomic(&path, &data).map_err(|source| ScanError::FileWrite {
            path: path.clone(),
            source,
        })?;

        info!("Borehole {}: {} page(s) listed", bgs_id, entries.len());
        Ok(entries)
    }
}

fn load_cached(path: &Path) -> Result<Vec<ManifestEntry>> {
    let data = fs::read(path)?;
    serde_json::from_slice(&data).map_err(|source| ScanError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a CRLF-separated listing body.
///
/// Each non-empty line is one page; the page number is the line's position
/// in the body (1-based). Not-found lines become the confidential marker.
pub fn parse_listing(bgs_id: i64, body: &str) -> Vec<ManifestEntry> {
    body.split("\r\n")
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| {
            let line = line.trim();
            let url = if line.to_lowercase().contains(NOT_FOUND_MESSAGE) {
                PageUrl::Confidential
            } else {
                PageUrl::Link(line.to_string())
            };
            ManifestEntry {
                bgs_id,
                page: i as u32 + 1,
                url,
            }
        })
        .collect()
}
