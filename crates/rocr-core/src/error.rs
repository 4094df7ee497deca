//! Error types for the rocr-core library.

use thiserror::Error;

/// Main error type for the rocr library.
///
/// Fields that cannot be found in a receipt are not errors; they come back
/// as `None` in the extracted fields.
#[derive(Error, Debug)]
pub enum RocrError {
    /// Empty or undecodable input document.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The configured engine has no implementation.
    #[error("unsupported OCR engine: {0}")]
    UnsupportedEngine(String),

    /// Recognition did not finish within the configured wall-clock limit.
    #[error("OCR timed out after {0}s")]
    Timeout(u64),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RocrError {
    /// Whether the caller sent something we cannot read (HTTP 400 territory).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RocrError::InvalidInput(_))
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF has more pages than the configured limit.
    #[error("PDF has {pages} pages, limit is {limit}")]
    TooManyPages { pages: u32, limit: u32 },

    /// A page could not be turned into a raster image.
    #[error("failed to render page {page}: {message}")]
    Render { page: u32, message: String },

    /// The PDFium library could not be bound.
    #[error("failed to bind PDFium: {0}")]
    Bind(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to initialize the recognition engine.
    #[error("failed to initialize engine: {0}")]
    Init(String),

    /// Failed to hand the page image to the engine.
    #[error("failed to set image: {0}")]
    ImageSetup(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The engine is known but was not compiled into this build.
    #[error("engine not available in this build: {0}")]
    EngineUnavailable(String),

    /// The blocking recognition task could not be joined.
    #[error("recognition task failed: {0}")]
    Join(String),
}

/// Result type for the rocr library.
pub type Result<T> = std::result::Result<T, RocrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_classification() {
        assert!(RocrError::InvalidInput("empty file".to_string()).is_invalid_input());
        assert!(!RocrError::UnsupportedEngine("paddle".to_string()).is_invalid_input());
        assert!(!RocrError::Timeout(30).is_invalid_input());
    }

    #[test]
    fn test_error_messages() {
        let err = RocrError::UnsupportedEngine("paddle".to_string());
        assert_eq!(err.to_string(), "unsupported OCR engine: paddle");

        let err: RocrError = PdfError::Render {
            page: 2,
            message: "no raster image".to_string(),
        }
        .into();
        assert!(err.to_string().contains("page 2"));
    }
}
