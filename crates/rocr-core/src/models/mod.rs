//! Data models for configuration and receipt results.

pub mod config;
pub mod receipt;

pub use config::{ExtractionConfig, OcrConfig, PdfConfig, PreprocessConfig, RocrConfig, ServerConfig};
pub use receipt::{
    assemble, BatchReceipt, LineItem, OcrResult, PageText, ParsedReceipt, RawOcr, RawText,
    ReceiptOutput, Totals,
};
