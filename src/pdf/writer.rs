//! Wraps page images into a PDF, one image per page.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;
use std::path::PathBuf;

use crate::error::{Result, ScanError};

/// Resolution assumed for scans, which carry no usable DPI
const ASSUMED_DPI: f32 = 96.0;

/// Build a PDF from images in the given order and return its bytes.
pub fn images_to_pdf(images: &[PathBuf]) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(ScanError::Conversion("no images to convert".to_string()));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(images.len());

    for path in images {
        let img = image::open(path)
            .map_err(|e| ScanError::Conversion(format!("{}: {}", path.display(), e)))?;
        let (width, height) = (img.width(), img.height());

        // Greyscale scans stay single channel
        let (pixels, color_space) = if img.color().has_color() {
            (img.to_rgb8().into_raw(), "DeviceRGB")
        } else {
            (img.to_luma8().into_raw(), "DeviceGray")
        };

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&pixels)
            .map_err(|e| ScanError::Conversion(e.to_string()))?;
        let data = encoder
            .finish()
            .map_err(|e| ScanError::Conversion(e.to_string()))?;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            data,
        ));

        let width_pt = width as f32 * 72.0 / ASSUMED_DPI;
        let height_pt = height as f32 * 72.0 / ASSUMED_DPI;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width_pt.into(),
                        0.into(),
                        0.into(),
                        height_pt.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width_pt.into(), height_pt.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ScanError::Conversion(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn image_color_spaces(doc: &Document) -> Vec<Vec<u8>> {
        doc.objects
            .values()
            .filter_map(|object| match object {
                Object::Stream(stream) => match stream.dict.get(b"ColorSpace") {
                    Ok(Object::Name(name)) => Some(name.clone()),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_one_page_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        RgbImage::from_pixel(96, 48, Rgb([255, 0, 0])).save(&a).unwrap();
        RgbImage::from_pixel(10, 20, Rgb([0, 0, 255])).save(&b).unwrap();

        let bytes = images_to_pdf(&[a, b]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(
            image_color_spaces(&doc),
            vec![b"DeviceRGB".to_vec(), b"DeviceRGB".to_vec()]
        );
    }

    #[test]
    fn test_greyscale_scan_embedded_as_gray() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.png");
        GrayImage::from_pixel(40, 30, Luma([128])).save(&page).unwrap();

        let bytes = images_to_pdf(&[page]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        assert_eq!(image_color_spaces(&doc), vec![b"DeviceGray".to_vec()]);
    }

    #[test]
    fn test_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.png");
        std::fs::write(&bogus, b"<html>404</html>").unwrap();

        assert!(matches!(
            images_to_pdf(&[bogus]),
            Err(ScanError::Conversion(_))
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(images_to_pdf(&[]).is_err());
    }
}
