//! Embedded page image extraction using lopdf.
//!
//! Scanned receipts are usually a PDF with one raster image per page. This
//! rasterizer takes the largest image XObject of each page as that page's
//! raster. Pages without an embedded image fail; there is no text
//! rendering here.

use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{check_page_limit, fit_dimensions, PageImage, PageRasterizer, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Rasterizer that uses the images embedded in each page.
pub struct EmbeddedImageRasterizer {
    config: PdfConfig,
}

impl EmbeddedImageRasterizer {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    fn load(data: &[u8]) -> Result<Document> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Ok(doc)
    }

    fn page_image(&self, doc: &Document, page_id: ObjectId, number: u32) -> Result<PageImage> {
        let largest = page_images(doc, page_id)
            .into_iter()
            .max_by_key(|img| img.width() as u64 * img.height() as u64)
            .ok_or_else(|| PdfError::Render {
                page: number,
                message: "no embedded raster image".to_string(),
            })?;

        let (width, height) = (largest.width(), largest.height());
        let (fit_w, fit_h) = fit_dimensions(width, height, self.config.max_dimension);
        let image = if (fit_w, fit_h) != (width, height) {
            largest.resize_exact(fit_w, fit_h, FilterType::Triangle).to_rgb8()
        } else {
            largest.to_rgb8()
        };

        trace!("Page {} raster {}x{}", number, image.width(), image.height());
        Ok(PageImage { number, image })
    }
}

impl PageRasterizer for EmbeddedImageRasterizer {
    fn rasterize(&self, data: &[u8]) -> Result<Vec<PageImage>> {
        let doc = Self::load(data)?;
        let page_ids = doc.get_pages();
        check_page_limit(page_ids.len() as u32, &self.config)?;

        let pages = page_ids
            .iter()
            .map(|(&number, &page_id)| self.page_image(&doc, page_id, number))
            .collect::<Result<Vec<_>>>()?;

        debug!("Extracted embedded images for {} pages", pages.len());
        Ok(pages)
    }
}

/// Decode every image XObject referenced by a page.
fn page_images(doc: &Document, page_id: ObjectId) -> Vec<DynamicImage> {
    let mut images = Vec::new();

    let Some(resources) = page_resources(doc, page_id) else {
        return images;
    };
    let Ok(xobjects) = resources.get(b"XObject") else {
        return images;
    };
    if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
        for (_name, obj_ref) in xobj_dict.iter() {
            if let Ok((_, obj)) = doc.dereference(obj_ref) {
                if let Some(img) = decode_image_object(doc, obj) {
                    images.push(img);
                }
            }
        }
    }

    images
}

fn decode_image_object(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;

    if let Ok(filter) = dict.get(b"Filter") {
        let filter_name = match filter {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        };

        match filter_name {
            Some(b"DCTDecode") => {
                // JPEG data is decoded from the raw stream
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                    .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Unsupported image filter {:?}", filter_name.map(String::from_utf8_lossy));
                return None;
            }
            _ => {}
        }
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);

    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    raw_to_image(data, width, height, color_space)
}

/// Raw 8-bit samples to an image. Declared sizes come from the file, so
/// buffer lengths are computed with overflow checks.
fn raw_to_image(mut data: Vec<u8>, width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;

    match color_space {
        b"DeviceRGB" | b"RGB" => {
            let len = pixels.checked_mul(3).filter(|&len| data.len() >= len)?;
            data.truncate(len);
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            data.truncate(pixels);
            ImageBuffer::<Luma<u8>, _>::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode image: data_len={}, colorspace={}",
                data.len(),
                String::from_utf8_lossy(color_space)
            );
            None
        }
    }
}

/// Resources dictionary for a page, following `Parent` inheritance.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

/// Build image-only PDFs for tests: one DeviceGray image per page.
#[cfg(test)]
pub(crate) fn image_pdf(pages: &[image::GrayImage]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for page in pages {
        let (w, h) = (page.width() as i64, page.height() as i64);
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => w,
                "Height" => h,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            page.as_raw().clone(),
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
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

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;
    use pretty_assertions::assert_eq;

    fn rasterizer() -> EmbeddedImageRasterizer {
        EmbeddedImageRasterizer::new(PdfConfig::default())
    }

    #[test]
    fn test_one_image_per_page() {
        let pages: Vec<GrayImage> = (0..3)
            .map(|i| GrayImage::from_pixel(20 + i, 10, Luma([200])))
            .collect();
        let rendered = rasterizer().rasterize(&image_pdf(&pages)).unwrap();

        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered.iter().map(|p| p.number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(rendered[2].image.dimensions(), (22, 10));
        assert_eq!(rendered[0].image.get_pixel(0, 0).0, [200, 200, 200]);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = rasterizer().rasterize(b"%PDF-1.4 this is not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_page_limit_enforced() {
        let pages = vec![GrayImage::new(4, 4); 2];
        let config = PdfConfig {
            max_pages: 1,
            ..PdfConfig::default()
        };
        let result = EmbeddedImageRasterizer::new(config).rasterize(&image_pdf(&pages));
        assert!(matches!(result, Err(PdfError::TooManyPages { pages: 2, limit: 1 })));
    }

    /// Rewrite the declared size of every image XObject in `pdf`.
    fn with_declared_size(pdf: &[u8], width: i64, height: i64) -> Vec<u8> {
        let mut doc = Document::load_mem(pdf).unwrap();
        for obj in doc.objects.values_mut() {
            if let Object::Stream(stream) = obj {
                if stream.dict.has(b"Width") {
                    stream.dict.set("Width", width);
                    stream.dict.set("Height", height);
                }
            }
        }
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_huge_declared_image_is_rejected() {
        let max = u32::MAX as i64;
        let pdf = with_declared_size(&image_pdf(&[GrayImage::new(4, 4)]), max, max);
        let result = rasterizer().rasterize(&pdf);
        assert!(matches!(result, Err(PdfError::Render { page: 1, .. })));
    }

    #[test]
    fn test_out_of_range_declared_size_is_rejected() {
        let pdf = with_declared_size(&image_pdf(&[GrayImage::new(4, 4)]), -4, 1 << 33);
        let result = rasterizer().rasterize(&pdf);
        assert!(matches!(result, Err(PdfError::Render { page: 1, .. })));
    }

    #[test]
    fn test_raw_buffer_size_overflow() {
        assert!(raw_to_image(vec![0; 16], u32::MAX, u32::MAX, b"DeviceRGB").is_none());
        assert!(raw_to_image(vec![0; 16], u32::MAX, u32::MAX, b"DeviceGray").is_none());
        assert!(raw_to_image(vec![7; 12], 2, 2, b"DeviceRGB").is_some());
    }

    #[test]
    fn test_large_page_is_scaled_down() {
        let pages = vec![GrayImage::new(300, 100)];
        let config = PdfConfig {
            max_dimension: 150,
            ..PdfConfig::default()
        };
        let rendered = EmbeddedImageRasterizer::new(config)
            .rasterize(&image_pdf(&pages))
            .unwrap();
        assert_eq!(rendered[0].image.dimensions(), (150, 50));
    }
}
