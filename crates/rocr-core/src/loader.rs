//! Document loading: turn an uploaded blob into ordered page images.

use image::ImageReader;
use std::io::Cursor;
use tracing::debug;

use crate::error::{PdfError, RocrError};
use crate::models::config::PdfConfig;
use crate::pdf::{self, PageImage};

/// Load a document into 1-indexed page images.
///
/// PDFs (by extension or `%PDF` header) yield one image per page in page
/// order; anything else is decoded as a single raster image.
pub fn load_pages(data: &[u8], filename: &str, config: &PdfConfig) -> crate::Result<Vec<PageImage>> {
    if data.is_empty() {
        return Err(RocrError::InvalidInput("empty file".to_string()));
    }

    if pdf::is_pdf_name(filename) || pdf::is_pdf_bytes(data) {
        debug!("Loading {} as PDF ({} bytes)", filename, data.len());
        return pdf::rasterize(data, config).map_err(pdf_error);
    }

    let image = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()
        .map_err(|e| RocrError::InvalidInput(format!("cannot decode {}: {}", filename, e)))?;

    debug!("Loaded {} as {}x{} image", filename, image.width(), image.height());
    Ok(vec![PageImage {
        number: 1,
        image: image.to_rgb8(),
    }])
}

/// Unreadable documents are input errors; rendering problems are not.
fn pdf_error(err: PdfError) -> RocrError {
    match err {
        PdfError::Parse(_) | PdfError::Encrypted | PdfError::NoPages | PdfError::TooManyPages { .. } => {
            RocrError::InvalidInput(err.to_string())
        }
        PdfError::Render { .. } | PdfError::Bind(_) => RocrError::Pdf(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};
    use pretty_assertions::assert_eq;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn embedded_only() -> PdfConfig {
        PdfConfig {
            prefer_pdfium: false,
            ..PdfConfig::default()
        }
    }

    #[test]
    fn test_empty_blob_is_invalid_input() {
        let err = load_pages(&[], "receipt.png", &PdfConfig::default()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_single_image_is_one_page() {
        let pages = load_pages(&png_bytes(12, 7), "receipt.jpg", &PdfConfig::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].image.dimensions(), (12, 7));
    }

    #[test]
    fn test_undecodable_image_is_invalid_input() {
        let err = load_pages(b"definitely not an image", "receipt.png", &PdfConfig::default()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_broken_pdf_is_invalid_input() {
        let err = load_pages(b"not a pdf at all", "receipt.pdf", &embedded_only()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_pdf_pages_in_order() {
        let pages: Vec<GrayImage> = (1..=3).map(|i| GrayImage::from_pixel(i * 10, 5, Luma([255]))).collect();
        let data = pdf::image_pdf(&pages);

        let loaded = load_pages(&data, "scan.PDF", &embedded_only()).unwrap();
        assert_eq!(loaded.iter().map(|p| p.number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(loaded[1].image.width(), 20);
    }

    #[test]
    fn test_pdf_detected_by_header() {
        let data = pdf::image_pdf(&[GrayImage::new(4, 4)]);
        let loaded = load_pages(&data, "upload", &embedded_only()).unwrap();
        assert_eq!(loaded.len(), 1);
    }
}
