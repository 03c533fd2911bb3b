use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use geo::Point;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use tracing::{debug, info, warn};

use super::BoundsFilter;
use crate::config::{DatasetConfig, BNG_CRS};
use crate::error::{Result, ScanError};
use crate::models::borehole::{BGS_ID_COLUMN, REGNO_COLUMN};
use crate::models::{BoreholeRecord, BoreholeSet};

/// Load boreholes whose location intersects `filter`.
///
/// With `BoundsFilter::None` the whole dataset is returned, which for the
/// national index is roughly 1.3 million records.
pub fn read_boreholes(dataset: &DatasetConfig, filter: &BoundsFilter) -> Result<BoreholeSet> {
    if !dataset.crs.eq_ignore_ascii_case(BNG_CRS) {
        return Err(ScanError::DataSource(format!(
            "dataset CRS {} is not supported, expected {}",
            dataset.crs, BNG_CRS
        )));
    }

    let path = &dataset.path;
    info!("Reading boreholes from {}", path.display());

    let file = File::open(path)
        .map_err(|e| ScanError::DataSource(format!("cannot open {}: {}", path.display(), e)))?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ScanError::DataSource(format!("column '{}' not found in {}", name, path.display()))
        })
    };
    let id_idx = column(BGS_ID_COLUMN)?;
    let regno_idx = column(REGNO_COLUMN)?;
    let x_idx = column(&dataset.x_column)?;
    let y_idx = column(&dataset.y_column)?;

    let index = filter.index();
    if index.is_none() {
        warn!("No bounding filter given, loading the entire dataset (slow and memory intensive)");
    }

    let mut set = BoreholeSet::new(headers.iter().map(str::to_string).collect());
    let mut seen = HashSet::new();
    let mut scanned = 0u64;

    for (line, result) in csv_reader.records().enumerate() {
        let row = result?;
        scanned += 1;

        let easting = parse_coord(&row[x_idx], line)?;
        let northing = parse_coord(&row[y_idx], line)?;
        let location = Point::new(easting, northing);

        if let Some(ref index) = index {
            if !index.matches(&location) {
                continue;
            }
        }

        let bgs_id = parse_id(&row[id_idx], line)?;
        if !seen.insert(bgs_id) {
            debug!("Skipping duplicate BGS_ID {}", bgs_id);
            continue;
        }

        let attributes: BTreeMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();

        set.records.push(BoreholeRecord {
            bgs_id,
            regno: row[regno_idx].to_string(),
            location,
            attributes,
        });
    }

    info!("Matched {} of {} boreholes", set.len(), scanned);
    Ok(set)
}

/// Identifiers sometimes come through as floats ("12345.0") from shapefile exports
fn parse_id(raw: &str, line: usize) -> Result<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(f as i64),
        _ => Err(ScanError::DataSource(format!(
            "invalid BGS_ID '{}' on data row {}",
            raw,
            line + 1
        ))),
    }
}

fn parse_coord(raw: &str, line: usize) -> Result<f64> {
    raw.parse::<f64>().map_err(|_| {
        ScanError::DataSource(format!("invalid coordinate '{}' on data row {}", raw, line + 1))
    })
}
