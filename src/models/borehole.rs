//! Borehole records loaded from the point dataset.

use geo::Point;
use std::collections::BTreeMap;

/// Column holding the numeric BGS identifier
pub const BGS_ID_COLUMN: &str = "BGS_ID";
/// Column holding the registration code
pub const REGNO_COLUMN: &str = "REGNO";

/// A single borehole from the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct BoreholeRecord {
    /// BGS identifier, unique within a dataset
    pub bgs_id: i64,

    /// Registration code, e.g. "SK51NW/12". May contain `/`.
    pub regno: String,

    /// Location in British National Grid (easting, northing)
    pub location: Point<f64>,

    /// Every column of the source row, verbatim, keyed by header
    pub attributes: BTreeMap<String, String>,
}

impl BoreholeRecord {
    pub fn new(bgs_id: i64, regno: &str, easting: f64, northing: f64) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(BGS_ID_COLUMN.to_string(), bgs_id.to_string());
        attributes.insert(REGNO_COLUMN.to_string(), regno.to_string());
        Self {
            bgs_id,
            regno: regno.to_string(),
            location: Point::new(easting, northing),
            attributes,
        }
    }

    /// Filesystem-safe form of the registration code
    pub fn file_stem(&self) -> String {
        file_stem(&self.regno)
    }
}

/// Replace path separators in a registration code so it can name a file.
pub fn file_stem(regno: &str) -> String {
    regno.replace('/', "_")
}

/// Records matching a query, plus the dataset's column order.
#[derive(Debug, Clone, Default)]
pub struct BoreholeSet {
    /// Header of the source dataset, in file order
    pub columns: Vec<String>,
    pub records: Vec<BoreholeRecord>,
}

impl BoreholeSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoreholeRecord> {
        self.records.iter()
    }
}
