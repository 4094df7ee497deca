//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the rocr pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RocrConfig {
    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Image preprocessing configuration.
    pub preprocess: PreprocessConfig,

    /// Receipt field extraction configuration.
    pub extraction: ExtractionConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine selector ("tesseract" is the only implemented engine).
    pub engine: String,

    /// Recognition language.
    pub language: String,

    /// Directory containing tessdata (system default if unset).
    pub tessdata_path: Option<PathBuf>,

    /// Wall-clock limit for one document, in seconds (0 = no limit).
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: "tesseract".to_string(),
            language: "eng".to_string(),
            tessdata_path: None,
            timeout_secs: 60,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Longest side of a rendered page, in pixels.
    pub max_dimension: u32,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: u32,

    /// Render with PDFium when the library can be bound.
    pub prefer_pdfium: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 200,
            max_dimension: 4000,
            max_pages: 0,
            prefer_pdfium: true,
        }
    }
}

/// Image preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Run the full normalization chain (grayscale only when false).
    pub enabled: bool,

    /// Bilateral filter neighbourhood diameter.
    pub bilateral_diameter: u32,

    /// Bilateral filter range sigma.
    pub bilateral_sigma_color: f32,

    /// Bilateral filter spatial sigma.
    pub bilateral_sigma_space: f32,

    /// Adaptive threshold neighbourhood size (odd).
    pub threshold_block_size: u32,

    /// Constant subtracted from the local mean.
    pub threshold_c: i32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bilateral_diameter: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            threshold_block_size: 31,
            threshold_c: 2,
        }
    }
}

/// Receipt field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Currency reported in service-mode results.
    pub default_currency: String,

    /// Number of leading non-empty lines searched for the merchant.
    pub merchant_scan_lines: usize,

    /// Minimum merchant length, in characters.
    pub merchant_min_len: usize,

    /// Merchant names are truncated to this many characters.
    pub merchant_max_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_currency: "PHP".to_string(),
            merchant_scan_lines: 5,
            merchant_min_len: 4,
            merchant_max_len: 80,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Upper bound for an uploaded document, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl RocrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Apply overrides from the process environment.
    ///
    /// Only binaries call this, once at startup; the library itself never
    /// reads the environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), crate::RocrError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), crate::RocrError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(engine) = lookup("OCR_ENGINE") {
            self.ocr.engine = engine;
        }
        if let Some(lang) = lookup("OCR_LANG") {
            self.ocr.language = lang;
        }
        if let Some(path) = lookup("TESSDATA_PREFIX") {
            self.ocr.tessdata_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup("OCR_TIMEOUT_SECS") {
            self.ocr.timeout_secs = secs.trim().parse().map_err(|_| {
                crate::RocrError::Config(format!("OCR_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        if let Some(host) = lookup("ROCR_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ROCR_PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                crate::RocrError::Config(format!("ROCR_PORT is not a port number: {}", port))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RocrConfig::default();
        assert_eq!(config.ocr.engine, "tesseract");
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.pdf.render_dpi, 200);
        assert_eq!(config.extraction.default_currency, "PHP");
        assert_eq!(config.extraction.merchant_scan_lines, 5);
    }

    #[test]
    fn test_stale_page_seg_mode_key_is_ignored() {
        let config: RocrConfig =
            serde_json::from_str(r#"{"ocr": {"page_seg_mode": 11, "language": "fil"}}"#).unwrap();
        assert_eq!(config.ocr.language, "fil");
        assert_eq!(config.ocr.engine, "tesseract");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RocrConfig = serde_json::from_str(r#"{"ocr": {"engine": "paddle"}}"#).unwrap();
        assert_eq!(config.ocr.engine, "paddle");
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.pdf.render_dpi, 200);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("OCR_ENGINE", "paddle"), ("ROCR_PORT", "9100")]
            .into_iter()
            .collect();

        let mut config = RocrConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.ocr.engine, "paddle");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = RocrConfig::default();
        let result = config.apply_overrides(|key| (key == "ROCR_PORT").then(|| "eighty".to_string()));
        assert!(matches!(result, Err(crate::RocrError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = RocrConfig::default();
        config.ocr.timeout_secs = 5;
        config.save(&path).unwrap();

        let loaded = RocrConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.timeout_secs, 5);
    }
}
