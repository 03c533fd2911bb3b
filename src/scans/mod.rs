//! Scan retrieval from the BGS SOBI scans service.
//!
//! Listing manifests are cached as `{id}_imgpath.json`, page images as
//! `{REGNO}_{PAGE}.png`. Presence of a file is the only cache signal.

mod client;
mod download;
mod manifest;

pub use client::{Fetch, ScanClient};
pub use download::{DownloadResult, DownloadStatus, Downloader};
pub use manifest::{parse_listing, ManifestFetcher};

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};

    use super::Fetch;
    use crate::error::{Result, ScanError};

    /// In-memory stand-in for the scans service that records every request.
    /// Unknown URLs answer with an empty body.
    #[derive(Default)]
    pub struct RecordingFetch {
        responses: HashMap<String, Vec<u8>>,
        failing: HashSet<String>,
        pub requests: RefCell<Vec<String>>,
    }

    impl RecordingFetch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.responses.insert(url.to_string(), body.into());
            self
        }

        pub fn fail(mut self, url: &str) -> Self {
            self.failing.insert(url.to_string());
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }

        fn answer(&self, url: &str) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(url.to_string());
            if self.failing.contains(url) {
                return Err(ScanError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("connection refused: {}", url),
                )));
            }
            Ok(self.responses.get(url).cloned().unwrap_or_default())
        }
    }

    impl Fetch for RecordingFetch {
        async fn get_text(&self, url: &str) -> Result<String> {
            let body = self.answer(url)?;
            Ok(String::from_utf8_lossy(&body).into_owned())
        }

        async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.answer(url)
        }
    }
}
