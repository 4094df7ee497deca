//! Tesseract text recognizer.
//!
//! Built with the `tesseract` feature this links libtesseract through
//! leptess. Without it the recognizer still exists, so engine selection
//! behaves the same, but every recognition call fails.

use image::GrayImage;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::TextRecognizer;

/// Page segmentation mode: assume a single uniform block of text.
const BLOCK_PAGE_SEG_MODE: &str = "6";

/// Tesseract recognizer configured for one language.
///
/// A fresh Tesseract handle is created per page; handles are not shareable
/// across threads.
pub struct TesseractRecognizer {
    config: OcrConfig,
}

impl TesseractRecognizer {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[cfg(feature = "tesseract")]
    fn recognize(&self, page: &GrayImage) -> Result<String, OcrError> {
        use std::io::Cursor;
        use std::time::Instant;

        use leptess::{LepTess, Variable};
        use tracing::debug;

        let start = Instant::now();

        let data_path = self
            .config
            .tessdata_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());
        let mut tess = LepTess::new(data_path.as_deref(), &self.config.language)
            .map_err(|e| OcrError::Init(e.to_string()))?;

        tess.set_variable(Variable::TesseditPagesegMode, BLOCK_PAGE_SEG_MODE)
            .map_err(|e| OcrError::Init(e.to_string()))?;

        let mut png = Vec::new();
        page.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| OcrError::ImageSetup(e.to_string()))?;
        tess.set_image_from_mem(&png)
            .map_err(|e| OcrError::ImageSetup(e.to_string()))?;

        let text = tess
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        debug!(
            "Tesseract recognized {} chars in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    #[cfg(not(feature = "tesseract"))]
    fn recognize(&self, _page: &GrayImage) -> Result<String, OcrError> {
        Err(OcrError::EngineUnavailable(format!(
            "tesseract ({}) requires building with the `tesseract` feature",
            self.config.language
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(TesseractRecognizer::new(OcrConfig::default()).name(), "tesseract");
    }

    #[test]
    fn test_segmentation_is_single_block() {
        assert_eq!(BLOCK_PAGE_SEG_MODE, "6");
    }

    #[cfg(feature = "tesseract")]
    #[test]
    fn test_missing_tessdata_is_init_error() {
        let config = OcrConfig {
            tessdata_path: Some("/nonexistent/tessdata".into()),
            ..OcrConfig::default()
        };
        let result = TesseractRecognizer::new(config).recognize(&GrayImage::new(4, 4));
        assert!(matches!(result, Err(OcrError::Init(_))));
    }

    #[cfg(not(feature = "tesseract"))]
    #[test]
    fn test_unavailable_without_feature() {
        let recognizer = TesseractRecognizer::new(OcrConfig::default());
        let result = recognizer.recognize(&GrayImage::new(4, 4));
        assert!(matches!(result, Err(OcrError::EngineUnavailable(_))));
    }
}
