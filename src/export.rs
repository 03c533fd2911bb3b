//! CSV export of the matched borehole set.

use csv::Writer;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, ScanError};
use crate::models::BoreholeSet;

pub const EXPORT_FILE_NAME: &str = "boreholes_in_polyline.csv";

/// Write `boreholes` with the dataset's columns. The header row is always
/// written, even for an empty set.
pub fn write_boreholes_csv(boreholes: &BoreholeSet, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(EXPORT_FILE_NAME);
    let write_error = |e: csv::Error| ScanError::FileWrite {
        path: path.clone(),
        source: e.into(),
    };

    let mut writer = Writer::from_path(&path).map_err(write_error)?;
    writer
        .write_record(&boreholes.columns)
        .map_err(write_error)?;
    for record in boreholes.iter() {
        writer
            .write_record(
                boreholes
                    .columns
                    .iter()
                    .map(|c| record.attributes.get(c).map(String::as_str).unwrap_or("")),
            )
            .map_err(write_error)?;
    }
    writer.flush().map_err(|source| ScanError::FileWrite {
        path: path.clone(),
        source,
    })?;

    info!("Exported {} borehole(s) to {}", boreholes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoreholeRecord;

    #[test]
    fn test_export_rows_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = BoreholeSet::new(vec!["REGNO".into(), "BGS_ID".into(), "NAME".into()]);
        let mut record = BoreholeRecord::new(5, "SK1/5", 1.0, 2.0);
        record.attributes.insert("NAME".into(), "WELL, DEEP".into());
        set.records.push(record);

        let path = write_boreholes_csv(&set, dir.path()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "REGNO,BGS_ID,NAME\nSK1/5,5,\"WELL, DEEP\"\n");
    }

    #[test]
    fn test_empty_set_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let set = BoreholeSet::new(vec!["BGS_ID".into(), "REGNO".into()]);

        let path = write_boreholes_csv(&set, dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "BGS_ID,REGNO\n");
    }
}
