//! End-to-end receipt pipeline: load, preprocess, recognize, extract, assemble.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{OcrError, RocrError};
use crate::loader::load_pages;
use crate::models::config::RocrConfig;
use crate::models::receipt::{assemble, OcrResult, PageText, ReceiptOutput};
use crate::ocr::{create_recognizer, select_engine, ImagePreprocessor, TextRecognizer};
use crate::receipt::{OutputMode, ReceiptExtractor};
use crate::Result;

/// Engine name reported when fields are parsed from already-recognized text.
pub const TEXT_ENGINE: &str = "text";

/// Receipt pipeline configured once and reused across calls.
///
/// Calls share no mutable state; two pipelines with different
/// configurations can run side by side.
pub struct ReceiptPipeline {
    config: RocrConfig,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    preprocessor: ImagePreprocessor,
    extractor: ReceiptExtractor,
}

/// Builder for ReceiptPipeline.
pub struct ReceiptPipelineBuilder {
    config: RocrConfig,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl ReceiptPipelineBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: RocrConfig::default(),
            recognizer: None,
        }
    }

    /// Set configuration.
    pub fn with_config(mut self, config: RocrConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this recognizer instead of the one the engine setting selects.
    ///
    /// The engine setting is still validated on every call.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> ReceiptPipeline {
        ReceiptPipeline {
            preprocessor: ImagePreprocessor::with_config(self.config.preprocess.clone()),
            extractor: ReceiptExtractor::from_config(&self.config.extraction),
            recognizer: self.recognizer,
            config: self.config,
        }
    }
}

impl Default for ReceiptPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptPipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: RocrConfig) -> Self {
        Self::builder().with_config(config).build()
    }

    /// Create a new builder.
    pub fn builder() -> ReceiptPipelineBuilder {
        ReceiptPipelineBuilder::new()
    }

    pub fn config(&self) -> &RocrConfig {
        &self.config
    }

    /// Configured engine name, as given.
    pub fn engine_name(&self) -> &str {
        &self.config.ocr.engine
    }

    fn recognizer(&self) -> Result<Arc<dyn TextRecognizer>> {
        select_engine(&self.config.ocr.engine)?;
        match &self.recognizer {
            Some(recognizer) => Ok(Arc::clone(recognizer)),
            None => create_recognizer(&self.config.ocr),
        }
    }

    /// Run one document through the pipeline.
    ///
    /// The engine is validated before the input is looked at. Pages run in
    /// order, and any page failure fails the whole document.
    pub fn process(&self, data: &[u8], filename: &str) -> Result<OcrResult> {
        let start = Instant::now();
        let recognizer = self.recognizer()?;
        let pages = load_pages(data, filename, &self.config.pdf)?;

        info!("Processing {} ({} pages)", filename, pages.len());

        let mut texts = Vec::with_capacity(pages.len());
        for page in &pages {
            let binary = self.preprocessor.process(&page.image);
            let text = recognizer.recognize(&binary)?;
            debug!("Page {}: {} chars", page.number, text.len());
            texts.push(PageText {
                page_number: page.number,
                text,
            });
        }

        let joined = texts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let fields = self.extractor.extract(&joined);

        info!(
            "Processed {} in {}ms (confidence {:.2})",
            filename,
            start.elapsed().as_millis(),
            fields.confidence
        );

        Ok(assemble(
            recognizer.name(),
            filename,
            texts,
            &fields,
            &self.config.extraction.default_currency,
        ))
    }

    /// Run [`process`](Self::process) on the blocking pool under the configured timeout.
    ///
    /// On timeout the whole call fails; no partial pages are returned.
    pub async fn process_async(self: &Arc<Self>, data: Vec<u8>, filename: String) -> Result<OcrResult> {
        select_engine(&self.config.ocr.engine)?;

        let pipeline = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || pipeline.process(&data, &filename));

        let secs = self.config.ocr.timeout_secs;
        let joined = if secs == 0 {
            task.await
        } else {
            tokio::time::timeout(Duration::from_secs(secs), task)
                .await
                .map_err(|_| RocrError::Timeout(secs))?
        };

        joined.map_err(|e| RocrError::Ocr(OcrError::Join(e.to_string())))?
    }

    /// Extract fields from text that was recognized elsewhere.
    pub fn parse_text(&self, text: &str, filename: &str, mode: OutputMode) -> ReceiptOutput {
        match mode {
            OutputMode::Batch => ReceiptOutput::Batch(self.extractor.extract_batch(text)),
            OutputMode::Service => {
                let fields = self.extractor.extract(text);
                let pages = vec![PageText {
                    page_number: 1,
                    text: text.to_string(),
                }];
                ReceiptOutput::Service(assemble(
                    TEXT_ENGINE,
                    filename,
                    pages,
                    &fields,
                    &self.config.extraction.default_currency,
                ))
            }
        }
    }
}
