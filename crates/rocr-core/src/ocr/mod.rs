//! OCR engine adapter: preprocessing and text recognition.

mod preprocessing;
mod tesseract;

pub use preprocessing::{normalize, ImagePreprocessor};
pub use tesseract::TesseractRecognizer;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::GrayImage;
use tracing::debug;

use crate::error::{OcrError, RocrError};
use crate::models::config::OcrConfig;

/// Known engine names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Tesseract via leptess.
    Tesseract,
    /// PaddleOCR. Recognized as a name, never implemented.
    Paddle,
}

impl EngineKind {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::Tesseract => "tesseract",
            EngineKind::Paddle => "paddle",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = RocrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tesseract" => Ok(EngineKind::Tesseract),
            "paddle" => Ok(EngineKind::Paddle),
            _ => Err(RocrError::UnsupportedEngine(s.to_string())),
        }
    }
}

/// Resolve a configured engine name to an implemented engine.
///
/// Unknown names and `paddle` both fail with [`RocrError::UnsupportedEngine`].
pub fn select_engine(name: &str) -> Result<EngineKind, RocrError> {
    match name.parse::<EngineKind>()? {
        EngineKind::Tesseract => Ok(EngineKind::Tesseract),
        EngineKind::Paddle => Err(RocrError::UnsupportedEngine(name.to_string())),
    }
}

/// Turns a preprocessed page into text.
pub trait TextRecognizer: Send + Sync {
    /// Engine name reported in results.
    fn name(&self) -> &str;

    /// Recognize the text of one page.
    fn recognize(&self, page: &GrayImage) -> Result<String, OcrError>;
}

/// Create the recognizer for the configured engine.
pub fn create_recognizer(config: &OcrConfig) -> Result<Arc<dyn TextRecognizer>, RocrError> {
    let kind = select_engine(&config.engine)?;
    debug!("Selected OCR engine: {}", kind);

    match kind {
        EngineKind::Tesseract => Ok(Arc::new(TesseractRecognizer::new(config.clone()))),
        EngineKind::Paddle => Err(RocrError::UnsupportedEngine(config.engine.clone())),
    }
}
