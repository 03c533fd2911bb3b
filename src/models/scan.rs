//! Borehole records joined with their image manifests.

use std::collections::{HashMap, HashSet};

use super::borehole::{file_stem, BoreholeSet};
use super::manifest::{ManifestEntry, PageUrl};

/// One row of the record + manifest table.
///
/// `page` and `url` are empty when the borehole had no manifest entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
    pub bgs_id: i64,
    pub regno: String,
    pub page: Option<u32>,
    pub url: Option<PageUrl>,
}

impl ScanRow {
    /// Scratch cache file name for this page: `{REGNO}_{PAGE}.png`
    pub fn image_name(&self) -> Option<String> {
        self.page
            .map(|page| format!("{}_{}.png", file_stem(&self.regno), page))
    }
}

/// Left join of a borehole set with the manifests fetched for it.
#[derive(Debug, Clone, Default)]
pub struct ScanTable {
    rows: Vec<ScanRow>,
}

impl ScanTable {
    pub fn new(rows: Vec<ScanRow>) -> Self {
        Self { rows }
    }

    /// Every record yields one row per manifest entry, or a single empty row
    /// when it has none.
    pub fn join(boreholes: &BoreholeSet, manifests: &HashMap<i64, Vec<ManifestEntry>>) -> Self {
        let mut rows = Vec::new();
        for record in boreholes.iter() {
            match manifests.get(&record.bgs_id) {
                Some(entries) if !entries.is_empty() => {
                    rows.extend(entries.iter().map(|entry| ScanRow {
                        bgs_id: record.bgs_id,
                        regno: record.regno.clone(),
                        page: Some(entry.page),
                        url: Some(entry.url.clone()),
                    }));
                }
                _ => rows.push(ScanRow {
                    bgs_id: record.bgs_id,
                    regno: record.regno.clone(),
                    page: None,
                    url: None,
                }),
            }
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[ScanRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct registration codes in first-seen order
    pub fn registration_codes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r.regno.as_str())
            .filter(|regno| seen.insert(*regno))
            .collect()
    }

    /// Rows that point at a fetchable image
    pub fn downloadable(&self) -> impl Iterator<Item = &ScanRow> {
        self.rows
            .iter()
            .filter(|r| r.page.is_some() && matches!(r.url, Some(PageUrl::Link(_))))
    }
}
