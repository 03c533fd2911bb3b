//! Image manifest entries as listed by the scans service.

use serde::{Deserialize, Serialize};

/// Stored in place of a URL when the service says the borehole does not exist.
/// In practice this means the record is confidential.
pub const CONFIDENTIAL_MARKER: &str = "Invalid location - likely to be confidential";

/// Stored when the service returned nothing at all for a borehole.
pub const INVALID_LOCATION_MARKER: &str = "Invalid location";

/// Where a page image lives, or why it cannot be fetched.
///
/// Serialized as a plain string so cached manifests keep the
/// `BGS_ID`, `PAGE`, `url` column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageUrl {
    Link(String),
    Confidential,
    InvalidLocation,
}

impl PageUrl {
    /// Whether this is a sentinel rather than a fetchable URL
    pub fn is_marker(&self) -> bool {
        !matches!(self, PageUrl::Link(_))
    }

    pub fn as_link(&self) -> Option<&str> {
        match self {
            PageUrl::Link(url) => Some(url),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PageUrl::Link(url) => url,
            PageUrl::Confidential => CONFIDENTIAL_MARKER,
            PageUrl::InvalidLocation => INVALID_LOCATION_MARKER,
        }
    }
}

impl From<String> for PageUrl {
    fn from(value: String) -> Self {
        match value.as_str() {
            CONFIDENTIAL_MARKER => PageUrl::Confidential,
            INVALID_LOCATION_MARKER => PageUrl::InvalidLocation,
            _ => PageUrl::Link(value),
        }
    }
}

impl From<PageUrl> for String {
    fn from(value: PageUrl) -> Self {
        match value {
            PageUrl::Link(url) => url,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of a borehole's scanned record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "BGS_ID")]
    pub bgs_id: i64,

    /// 1-based page number
    #[serde(rename = "PAGE")]
    pub page: u32,

    pub url: PageUrl,
}
