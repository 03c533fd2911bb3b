use geo::{Coord, LineString, Polygon};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::error::{Result, ScanError};

/// One vertex as exported by gridreferencefinder.com
#[derive(Debug, Deserialize)]
struct GridPoint {
    #[serde(rename = "X (Easting)")]
    easting: f64,
    #[serde(rename = "Y (Northing)")]
    northing: f64,
}

/// Build a polygon from a CSV of easting/northing vertices, in file order.
pub fn load_points_polygon(path: &Path) -> Result<Polygon<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ScanError::InvalidArgument(format!("{}: {}", path.display(), e)))?;

    let mut coords = Vec::new();
    for row in reader.deserialize::<GridPoint>() {
        let point = row.map_err(|e| {
            ScanError::InvalidArgument(format!("bad vertex in {}: {}", path.display(), e))
        })?;
        coords.push(Coord {
            x: point.easting,
            y: point.northing,
        });
    }

    if coords.len() < 3 {
        return Err(ScanError::InvalidArgument(format!(
            "{} has {} vertices; a polygon needs at least 3",
            path.display(),
            coords.len()
        )));
    }

    info!("Loaded polygon with {} vertices from {}", coords.len(), path.display());
    Ok(Polygon::new(LineString::new(coords), vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use std::fs;

    #[test]
    fn test_gridreferencefinder_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        fs::write(
            &path,
            "Point,Grid Ref,X (Easting),Y (Northing),Latitude,Longitude\n\
             1,SK 50000 10000,450000,310000,52.68,-1.26\n\
             2,SK 51000 10000,451000,310000,52.68,-1.25\n\
             3,SK 51000 11000,451000,311000,52.69,-1.25\n\
             4,SK 50000 11000,450000,311000,52.69,-1.26\n",
        )
        .unwrap();

        let polygon = load_points_polygon(&path).unwrap();
        assert_eq!(polygon.unsigned_area(), 1_000_000.0);
        // Ring is closed automatically
        assert_eq!(polygon.exterior().0.len(), 5);
    }

    #[test]
    fn test_too_few_vertices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        fs::write(&path, "X (Easting),Y (Northing)\n1,1\n2,2\n").unwrap();

        let err = load_points_polygon(&path).unwrap_err();
        assert!(matches!(err, ScanError::InvalidArgument(_)));
    }
}
