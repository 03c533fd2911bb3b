//! Per-borehole PDF assembly from the scratch image cache.

mod writer;

pub use writer::images_to_pdf;

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::cache::write_atomic;
use crate::error::{Result, ScanError};
use crate::models::{file_stem, ScanTable};

/// Outcome of assembling one registration code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssemblyStatus {
    Written { pages: usize },
    /// Output PDF already present
    Exists,
    NoImages,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AssemblyResult {
    pub regno: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: AssemblyStatus,
}

/// Scratch images keyed by exact file stem, each list sorted by page.
///
/// File names are `{stem}_{page}.png`; the stem is split off at the last `_`.
#[derive(Debug, Default)]
pub struct ScratchIndex {
    images: HashMap<String, Vec<(u32, PathBuf)>>,
}

impl ScratchIndex {
    pub fn scan(dir: &Path) -> Self {
        let mut images: HashMap<String, Vec<(u32, PathBuf)>> = HashMap::new();

        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().map_or(true, |e| e != "png") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some((stem, page)) = name.rsplit_once('_') else {
                continue;
            };
            let Ok(page) = page.parse::<u32>() else {
                continue;
            };
            images
                .entry(stem.to_string())
                .or_default()
                .push((page, path.to_path_buf()));
        }

        for pages in images.values_mut() {
            pages.sort_by_key(|(page, _)| *page);
        }

        Self { images }
    }

    /// Images for a registration code in ascending page order
    pub fn images_for(&self, regno: &str) -> Vec<PathBuf> {
        self.images
            .get(&file_stem(regno))
            .map(|pages| pages.iter().map(|(_, p)| p.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.images.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Writes one PDF per registration code into the output directory.
pub struct Assembler {
    scratch_dir: PathBuf,
    output_dir: PathBuf,
}

impl Assembler {
    pub fn new(scratch_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_path(&self, regno: &str) -> PathBuf {
        self.output_dir.join(format!("{}.pdf", file_stem(regno)))
    }

    /// Assemble every distinct registration code in `table`.
    ///
    /// Existing PDFs are left alone. Conversion failures are recorded and the
    /// batch carries on.
    pub fn assemble(&self, table: &ScanTable) -> Result<Vec<AssemblyResult>> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ScanError::FileWrite {
            path: self.output_dir.clone(),
            source,
        })?;

        let index = ScratchIndex::scan(&self.scratch_dir);
        info!("Scratch cache holds {} image(s)", index.len());

        let results: Vec<AssemblyResult> = table
            .registration_codes()
            .into_iter()
            .map(|regno| {
                let path = self.output_path(regno);
                let status = self.assemble_one(regno, &path, &index);
                AssemblyResult {
                    regno: regno.to_string(),
                    path,
                    status,
                }
            })
            .collect();

        let written = results
            .iter()
            .filter(|r| matches!(r.status, AssemblyStatus::Written { .. }))
            .count();
        info!("Wrote {} PDF(s) for {} borehole(s)", written, results.len());
        Ok(results)
    }

    fn assemble_one(&self, regno: &str, path: &Path, index: &ScratchIndex) -> AssemblyStatus {
        if path.is_file() {
            return AssemblyStatus::Exists;
        }

        let images = index.images_for(regno);
        if images.is_empty() {
            warn!("Image not available for {}", regno);
            return AssemblyStatus::NoImages;
        }

        let result = images_to_pdf(&images).and_then(|bytes| {
            write_atomic(path, &bytes).map_err(|source| ScanError::FileWrite {
                path: path.to_path_buf(),
                source,
            })
        });

        match result {
            Ok(()) => {
                info!("{} -> {} ({} pages)", regno, path.display(), images.len());
                AssemblyStatus::Written {
                    pages: images.len(),
                }
            }
            Err(e) => {
                error!("Could not build PDF for {}: {}", regno, e);
                AssemblyStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScanRow;
    use image::{Rgb, RgbImage};
    use lopdf::{Document, Object};

    fn png(dir: &Path, name: &str, width: u32) {
        RgbImage::from_pixel(width, 8, Rgb([10, 20, 30]))
            .save(dir.join(name))
            .unwrap();
    }

    fn table(codes: &[&str]) -> ScanTable {
        ScanTable::new(
            codes
                .iter()
                .enumerate()
                .map(|(i, regno)| ScanRow {
                    bgs_id: i as i64,
                    regno: regno.to_string(),
                    page: Some(1),
                    url: None,
                })
                .collect(),
        )
    }

    fn page_widths(path: &Path) -> Vec<f32> {
        let doc = Document::load(path).unwrap();
        doc.get_pages()
            .values()
            .map(|id| {
                let page = doc.get_dictionary(*id).unwrap();
                let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
                match &media_box[2] {
                    Object::Integer(i) => *i as f32,
                    Object::Real(r) => *r as f32,
                    other => panic!("unexpected MediaBox value {:?}", other),
                }
            })
            .collect()
    }

    #[test]
    fn test_index_is_exact_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        png(dir.path(), "SK51NW_1_10.png", 1);
        png(dir.path(), "SK51NW_1_2.png", 1);
        png(dir.path(), "SK51NW_11_1.png", 1);
        std::fs::write(dir.path().join("3_imgpath.json"), "[]").unwrap();

        let index = ScratchIndex::scan(dir.path());
        let images = index.images_for("SK51NW/1");
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["SK51NW_1_2.png", "SK51NW_1_10.png"]);
        assert_eq!(index.images_for("SK51NW/11").len(), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_one_pdf_per_code_in_page_order() {
        let scratch = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        png(scratch.path(), "A_2.png", 192);
        png(scratch.path(), "A_1.png", 96);
        png(scratch.path(), "AB_1.png", 48);

        let assembler = Assembler::new(scratch.path(), output.path());
        let results = assembler.assemble(&table(&["A", "A", "AB"])).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, AssemblyStatus::Written { pages: 2 });
        assert_eq!(results[1].status, AssemblyStatus::Written { pages: 1 });
        // 96px at 96 dpi is 72pt
        assert_eq!(page_widths(&output.path().join("A.pdf")), vec![72.0, 144.0]);
        assert_eq!(page_widths(&output.path().join("AB.pdf")), vec![36.0]);
    }

    #[test]
    fn test_existing_pdf_and_missing_images() {
        let scratch = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        png(scratch.path(), "SK1_1_1.png", 4);
        std::fs::write(output.path().join("SK1_1.pdf"), b"keep me").unwrap();

        let assembler = Assembler::new(scratch.path(), output.path());
        let results = assembler.assemble(&table(&["SK1/1", "SK1/2"])).unwrap();

        assert_eq!(results[0].status, AssemblyStatus::Exists);
        assert_eq!(
            std::fs::read(output.path().join("SK1_1.pdf")).unwrap(),
            b"keep me"
        );
        assert_eq!(results[1].status, AssemblyStatus::NoImages);
        assert!(!output.path().join("SK1_2.pdf").exists());
    }

    #[test]
    fn test_conversion_failure_is_isolated() {
        let scratch = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(scratch.path().join("BROKEN_1.png"), b"not a png").unwrap();
        png(scratch.path(), "FINE_1.png", 4);

        let assembler = Assembler::new(scratch.path(), output.path());
        let results = assembler.assemble(&table(&["BROKEN", "FINE"])).unwrap();

        assert!(matches!(results[0].status, AssemblyStatus::Failed { .. }));
        assert!(!output.path().join("BROKEN.pdf").exists());
        assert_eq!(results[1].status, AssemblyStatus::Written { pages: 1 });
    }
}
