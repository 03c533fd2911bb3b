//! Core data models for borehole scan retrieval.

pub mod borehole;
pub mod manifest;
pub mod scan;

pub use borehole::{file_stem, BoreholeRecord, BoreholeSet};
pub use manifest::{ManifestEntry, PageUrl, CONFIDENTIAL_MARKER, INVALID_LOCATION_MARKER};
pub use scan::{ScanRow, ScanTable};
