//! Receipt field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{score, ExtractedFields, ReceiptExtractor};
pub use rules::{TotalMatch, TotalTier};

/// Which output shape a caller wants from the shared extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// `parsed.totals.total` + `items`, with per-page raw text.
    Service,
    /// Flat `total` + `receipt_date`, with the raw text and its lines.
    Batch,
}
