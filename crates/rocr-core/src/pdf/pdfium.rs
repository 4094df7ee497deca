//! Page rendering through a runtime-bound PDFium library.

use pdfium_render::prelude::*;
use tracing::debug;

use super::{check_page_limit, fit_dimensions, PageImage, PageRasterizer, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Rasterizer that renders full pages at the configured DPI.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
    config: PdfConfig,
}

impl PdfiumRasterizer {
    /// Bind to PDFium, trying local and common system locations.
    pub fn new(config: PdfConfig) -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("/usr/lib"))
            })
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                    "/usr/local/lib",
                ))
            })
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| PdfError::Bind(format!("could not find PDFium library: {}", e)))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
            config,
        })
    }

    fn render_page(&self, page: &PdfPage, number: u32) -> Result<PageImage> {
        // 72 points per inch
        let scale = self.config.render_dpi as f32 / 72.0;
        let (width, height) = fit_dimensions(
            (page.width().value * scale) as u32,
            (page.height().value * scale) as u32,
            self.config.max_dimension,
        );

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| PdfError::Render {
                page: number,
                message: e.to_string(),
            })?;

        Ok(PageImage {
            number,
            image: bitmap.as_image().to_rgb8(),
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, data: &[u8]) -> Result<Vec<PageImage>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| match e {
                PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                    PdfError::Encrypted
                }
                other => PdfError::Parse(other.to_string()),
            })?;

        let page_count = document.pages().len() as u32;
        check_page_limit(page_count, &self.config)?;

        let mut pages = Vec::with_capacity(page_count as usize);
        for (index, page) in document.pages().iter().enumerate() {
            pages.push(self.render_page(&page, index as u32 + 1)?);
        }

        debug!("PDFium rendered {} pages at {} DPI", pages.len(), self.config.render_dpi);
        Ok(pages)
    }
}
