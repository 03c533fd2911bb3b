//! Error taxonomy shared by every pipeline stage.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Borehole dataset missing, unreadable or malformed
    #[error("borehole dataset error: {0}")]
    DataSource(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Identifier input was valid but lookup by identifier is not available
    #[error("lookup by identifier is not available ({count} identifier(s) given); use a polygon instead")]
    IdentifierLookupUnavailable { count: usize },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    /// Cached manifest file exists but cannot be parsed
    #[error("corrupt manifest cache {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not serialize run report: {0}")]
    Report(#[source] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ScanError {
    fn from(e: csv::Error) -> Self {
        ScanError::DataSource(e.to_string())
    }
}

impl From<lopdf::Error> for ScanError {
    fn from(e: lopdf::Error) -> Self {
        ScanError::Conversion(e.to_string())
    }
}

impl From<image::ImageError> for ScanError {
    fn from(e: image::ImageError) -> Self {
        ScanError::Conversion(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
