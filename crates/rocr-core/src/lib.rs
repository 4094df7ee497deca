//! Core library for receipt OCR processing.
//!
//! This crate provides:
//! - Document loading (raster images and multi-page PDFs)
//! - Page preprocessing and text recognition (Tesseract)
//! - Receipt field extraction (merchant, date, total) with confidence scoring
//! - Result models for the service and batch output shapes

pub mod error;
pub mod loader;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod receipt;

pub use error::{OcrError, PdfError, Result, RocrError};
pub use loader::load_pages;
pub use models::config::RocrConfig;
pub use models::receipt::{BatchReceipt, OcrResult, PageText, ReceiptOutput};
pub use ocr::{create_recognizer, select_engine, EngineKind, TextRecognizer};
pub use pdf::PageImage;
pub use pipeline::{ReceiptPipeline, ReceiptPipelineBuilder};
pub use receipt::{ExtractedFields, OutputMode, ReceiptExtractor};
