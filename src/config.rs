//! Run configuration.
//!
//! Everything that used to be hidden process-wide state (dataset location,
//! cache directories, provider host, proxy) lives here and is handed to each
//! component explicitly.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// Coordinate reference system of the borehole dataset (British National Grid).
pub const BNG_CRS: &str = "EPSG:27700";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub cache: CacheConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    /// Borehole point table (`.csv` or `.csv.gz`)
    pub path: PathBuf,
    pub crs: String,
    /// Column holding the easting
    pub x_column: String,
    /// Column holding the northing
    pub y_column: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./borehole/borehole.csv"),
            crs: BNG_CRS.to_string(),
            x_column: "EASTING".to_string(),
            y_column: "NORTHING".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// Where `{id}_imgpath.json` manifests are kept
    pub manifest_dir: PathBuf,
    /// Where downloaded page images are kept
    pub scratch_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            manifest_dir: PathBuf::from(".tmp"),
            scratch_dir: PathBuf::from(".tmp"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Internal host some listings still point at; rewritten to `base_url`'s host
    pub placeholder_host: String,
    /// HTTP proxy. `None` disables proxies entirely.
    pub proxy: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://scans.bgs.ac.uk".to_string(),
            placeholder_host: "localhost:8080".to_string(),
            proxy: None,
            timeout_secs: 60,
            user_agent: "borescan/0.1 (borehole scan downloader)".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScanError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ScanError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Host (with port, if any) of the public provider, e.g. `scans.bgs.ac.uk`
    pub fn public_host(&self) -> Result<String, ScanError> {
        let url = url::Url::parse(&self.provider.base_url)
            .map_err(|e| ScanError::Config(format!("invalid provider.base_url: {}", e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| ScanError::Config("provider.base_url has no host".to_string()))?;
        Ok(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_public_service() {
        let config = Config::default();
        assert_eq!(config.dataset.crs, BNG_CRS);
        assert_eq!(config.cache.manifest_dir, PathBuf::from(".tmp"));
        assert_eq!(config.public_host().unwrap(), "scans.bgs.ac.uk");
        assert!(config.provider.proxy.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[cache]\nscratch_dir = \"/var/tmp/scans\"\n\n[provider]\nbase_url = \"http://127.0.0.1:9000\""
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.cache.scratch_dir, PathBuf::from("/var/tmp/scans"));
        assert_eq!(config.cache.manifest_dir, PathBuf::from(".tmp"));
        assert_eq!(config.dataset.x_column, "EASTING");
        assert_eq!(config.public_host().unwrap(), "127.0.0.1:9000");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load_from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }
}
