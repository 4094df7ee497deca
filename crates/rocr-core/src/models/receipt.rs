//! Receipt output models.
//!
//! Two shapes are produced from the same extracted fields:
//! - [`OcrResult`] (service mode): what the HTTP endpoint and `rocr extract` return.
//! - [`BatchReceipt`] (batch mode): what `rocr parse` writes for pre-OCR'd text.

use serde::{Deserialize, Serialize};

use crate::receipt::ExtractedFields;

/// Full result of running the pipeline over one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Engine that recognized the pages.
    pub engine: String,

    /// Filename echoed from the request.
    pub filename: String,

    /// Parsed receipt fields.
    pub parsed: ParsedReceipt,

    /// Raw recognized text, one entry per page.
    pub raw_ocr: RawOcr,
}

/// Parsed fields in service mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub merchant: Option<String>,

    /// ISO-8601 date when the source format could be reordered.
    pub date: Option<String>,

    pub currency: String,

    pub totals: Totals,

    /// Line items are not extracted; always empty.
    pub items: Vec<LineItem>,

    /// Additive confidence score (0.0 - 1.0).
    pub confidence: f64,
}

/// Monetary totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total: Option<f64>,
}

/// Placeholder for a receipt line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub amount: Option<f64>,
}

/// Raw OCR output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOcr {
    pub pages: Vec<PageText>,
}

/// Recognized text of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed).
    pub page_number: u32,
    pub text: String,
}

/// Parsed fields in batch mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReceipt {
    pub merchant: Option<String>,
    pub receipt_date: Option<String>,
    pub total: Option<f64>,
    pub confidence: f64,
    pub raw: RawText,
}

/// Input text echoed back in batch mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawText {
    pub text: String,
    /// Non-empty trimmed lines of `text`.
    pub lines: Vec<String>,
}

/// Either output shape, serialized without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReceiptOutput {
    Service(OcrResult),
    Batch(BatchReceipt),
}

impl ReceiptOutput {
    /// Extraction confidence, whichever shape this is.
    pub fn confidence(&self) -> f64 {
        match self {
            ReceiptOutput::Service(result) => result.parsed.confidence,
            ReceiptOutput::Batch(receipt) => receipt.confidence,
        }
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        match self {
            ReceiptOutput::Service(result) => result.summary(),
            ReceiptOutput::Batch(receipt) => receipt.summary(),
        }
    }
}

impl OcrResult {
    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        summary_line(
            self.parsed.merchant.as_deref(),
            self.parsed.date.as_deref(),
            self.parsed.totals.total,
            self.parsed.confidence,
        )
    }
}

fn summary_line(merchant: Option<&str>, date: Option<&str>, total: Option<f64>, confidence: f64) -> String {
    format!(
        "merchant={} date={} total={} confidence={:.2}",
        merchant.unwrap_or("-"),
        date.unwrap_or("-"),
        total.map(|t| format!("{:.2}", t)).unwrap_or_else(|| "-".to_string()),
        confidence
    )
}

impl ParsedReceipt {
    /// Build the service-mode shape from extracted fields.
    pub fn from_fields(fields: &ExtractedFields, currency: &str) -> Self {
        Self {
            merchant: fields.merchant.clone(),
            date: fields.date.clone(),
            currency: currency.to_string(),
            totals: Totals {
                total: fields.total.as_ref().map(|t| t.value),
            },
            items: Vec::new(),
            confidence: fields.confidence,
        }
    }
}

impl BatchReceipt {
    /// Build the batch-mode shape from extracted fields and the source text.
    pub fn from_fields(fields: &ExtractedFields, text: &str) -> Self {
        Self {
            merchant: fields.merchant.clone(),
            receipt_date: fields.date.clone(),
            total: fields.total.as_ref().map(|t| t.value),
            confidence: fields.confidence,
            raw: RawText {
                text: text.to_string(),
                lines: text
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        }
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        summary_line(
            self.merchant.as_deref(),
            self.receipt_date.as_deref(),
            self.total,
            self.confidence,
        )
    }
}

/// Combine per-page text and extracted fields into the final result.
pub fn assemble(
    engine: &str,
    filename: &str,
    pages: Vec<PageText>,
    fields: &ExtractedFields,
    currency: &str,
) -> OcrResult {
    OcrResult {
        engine: engine.to_string(),
        filename: filename.to_string(),
        parsed: ParsedReceipt::from_fields(fields, currency),
        raw_ocr: RawOcr { pages },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{TotalMatch, TotalTier};
    use pretty_assertions::assert_eq;

    fn sample_fields() -> ExtractedFields {
        ExtractedFields {
            merchant: Some("JOLLIBEE FOODS".to_string()),
            date: Some("2026-03-15".to_string()),
            total: Some(TotalMatch {
                value: 150.0,
                tier: TotalTier::KeywordWithCurrency,
            }),
            confidence: 1.0,
        }
    }

    #[test]
    fn test_service_shape_json() {
        let pages = vec![PageText {
            page_number: 1,
            text: "JOLLIBEE FOODS".to_string(),
        }];
        let result = assemble("tesseract", "r.png", pages, &sample_fields(), "PHP");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["engine"], "tesseract");
        assert_eq!(json["filename"], "r.png");
        assert_eq!(json["parsed"]["currency"], "PHP");
        assert_eq!(json["parsed"]["totals"]["total"], 150.0);
        assert_eq!(json["parsed"]["items"], serde_json::json!([]));
        assert_eq!(json["raw_ocr"]["pages"][0]["page_number"], 1);
    }

    #[test]
    fn test_missing_fields_serialize_as_null() {
        let result = assemble("tesseract", "r.png", Vec::new(), &ExtractedFields::default(), "PHP");
        let json = serde_json::to_value(&result).unwrap();

        assert!(json["parsed"]["merchant"].is_null());
        assert!(json["parsed"]["date"].is_null());
        assert!(json["parsed"]["totals"]["total"].is_null());
        assert_eq!(json["parsed"]["confidence"], 0.0);
    }

    #[test]
    fn test_batch_shape() {
        let text = "JOLLIBEE FOODS\n\n  Total: PHP 150.00  \n";
        let receipt = BatchReceipt::from_fields(&sample_fields(), text);

        assert_eq!(receipt.receipt_date.as_deref(), Some("2026-03-15"));
        assert_eq!(receipt.raw.lines, vec!["JOLLIBEE FOODS", "Total: PHP 150.00"]);
        assert_eq!(
            receipt.summary(),
            "merchant=JOLLIBEE FOODS date=2026-03-15 total=150.00 confidence=1.00"
        );

        let json = serde_json::to_value(&receipt).unwrap();
        assert!(json.get("receipt_date").is_some());
        assert!(json.get("date").is_none());
    }
}
