//! PDF rasterization.
//!
//! Pages are rendered with PDFium when the shared library can be bound at
//! runtime. Otherwise the embedded-image rasterizer pulls each page's
//! scanned image straight out of the document, which covers the common
//! case of a receipt scanned to PDF.

mod extractor;
mod pdfium;

pub use extractor::EmbeddedImageRasterizer;
pub use pdfium::PdfiumRasterizer;

#[cfg(test)]
pub(crate) use extractor::image_pdf;

use image::RgbImage;
use tracing::{debug, warn};

use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// One rasterized page.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Page number (1-indexed).
    pub number: u32,
    pub image: RgbImage,
}

/// Trait for turning a PDF into page images.
pub trait PageRasterizer {
    /// Rasterize every page, in document order.
    fn rasterize(&self, data: &[u8]) -> Result<Vec<PageImage>>;
}

/// Rasterize a PDF with the best available backend.
pub fn rasterize(data: &[u8], config: &PdfConfig) -> Result<Vec<PageImage>> {
    let pages = if config.prefer_pdfium {
        match PdfiumRasterizer::new(config.clone()) {
            Ok(rasterizer) => rasterizer.rasterize(data)?,
            Err(e) => {
                warn!("{}; falling back to embedded page images", e);
                EmbeddedImageRasterizer::new(config.clone()).rasterize(data)?
            }
        }
    } else {
        EmbeddedImageRasterizer::new(config.clone()).rasterize(data)?
    };

    debug!("Rasterized {} PDF pages", pages.len());
    Ok(pages)
}

/// Reject documents above the configured page limit (0 = unlimited).
pub(crate) fn check_page_limit(pages: u32, config: &PdfConfig) -> Result<()> {
    if pages == 0 {
        return Err(PdfError::NoPages);
    }
    if config.max_pages > 0 && pages > config.max_pages {
        return Err(PdfError::TooManyPages {
            pages,
            limit: config.max_pages,
        });
    }
    Ok(())
}

/// Scale dimensions down so the longest side fits `max_dimension`.
pub(crate) fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return (width, height);
    }
    let ratio = max_dimension as f32 / width.max(height) as f32;
    (
        ((width as f32 * ratio) as u32).max(1),
        ((height as f32 * ratio) as u32).max(1),
    )
}

/// Check if bytes start with the PDF magic header.
pub fn is_pdf_bytes(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

/// Check if a filename has a PDF extension.
pub fn is_pdf_name(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pdf_detection() {
        assert!(is_pdf_bytes(b"%PDF-1.7\n"));
        assert!(!is_pdf_bytes(b"\x89PNG"));
        assert!(is_pdf_name("receipt.PDF"));
        assert!(is_pdf_name("scan.pdf"));
        assert!(!is_pdf_name("scan.png"));
        assert!(!is_pdf_name("pdf"));
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(1000, 500, 4000), (1000, 500));
        assert_eq!(fit_dimensions(8000, 4000, 4000), (4000, 2000));
        assert_eq!(fit_dimensions(100, 100, 0), (100, 100));
    }

    #[test]
    fn test_page_limit() {
        let mut config = PdfConfig::default();
        assert!(check_page_limit(50, &config).is_ok());
        assert!(matches!(check_page_limit(0, &config), Err(PdfError::NoPages)));

        config.max_pages = 3;
        assert!(matches!(
            check_page_limit(4, &config),
            Err(PdfError::TooManyPages { pages: 4, limit: 3 })
        ));
    }
}
