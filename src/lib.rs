//! Borescan - borehole scan downloader for the BGS SOBI scans service
//!
//! Finds boreholes inside a polygon, downloads their scanned record pages and
//! assembles one PDF per borehole.

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod index;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod scans;

pub use config::Config;
pub use error::{Result, ScanError};
pub use models::{BoreholeRecord, BoreholeSet, ManifestEntry, PageUrl, ScanTable};
