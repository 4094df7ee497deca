//! Receipt field extraction combining the merchant, date and total rules.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::BatchReceipt;

use super::rules::{
    DateExtractor, FieldExtractor, MerchantExtractor, TotalExtractor, TotalMatch, TotalTier,
};

const MERCHANT_WEIGHT: f64 = 0.2;
const KEYWORD_TOTAL_WEIGHT: f64 = 0.4;
const FALLBACK_TOTAL_WEIGHT: f64 = 0.3;
const DATE_WEIGHT: f64 = 0.2;
const ALL_FIELDS_BONUS: f64 = 0.2;

/// Fields extracted from receipt text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub merchant: Option<String>,
    /// Normalized transaction date.
    pub date: Option<String>,
    pub total: Option<TotalMatch>,
    /// Additive confidence in [0.0, 1.0], rounded to 2 decimals.
    pub confidence: f64,
}

/// Deterministic receipt extractor.
///
/// Each field is extracted independently in a single pass; the confidence
/// is derived from which fields were found and which tier found the total.
pub struct ReceiptExtractor {
    merchant: MerchantExtractor,
    date: DateExtractor,
    total: TotalExtractor,
}

impl ReceiptExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            merchant: MerchantExtractor::new()
                .with_scan_lines(config.merchant_scan_lines)
                .with_length_bounds(config.merchant_min_len, config.merchant_max_len),
            date: DateExtractor::new(),
            total: TotalExtractor::new(),
        }
    }

    /// Extract merchant, date and total from text.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        let merchant = self.merchant.extract(text).map(|m| m.value);
        let date = self.date.extract(text).map(|m| m.value);
        let total = self.total.extract(text);

        let confidence = score(merchant.is_some(), total.map(|t| t.tier), date.is_some());

        debug!(
            "Extracted merchant={:?} date={:?} total={:?} confidence={:.2}",
            merchant, date, total, confidence
        );

        ExtractedFields {
            merchant,
            date,
            total,
            confidence,
        }
    }

    /// Extract fields and shape them for batch output.
    pub fn extract_batch(&self, text: &str) -> BatchReceipt {
        BatchReceipt::from_fields(&self.extract(text), text)
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence for a combination of found fields.
pub fn score(merchant: bool, total: Option<TotalTier>, date: bool) -> f64 {
    let mut confidence = 0.0;

    if merchant {
        confidence += MERCHANT_WEIGHT;
    }
    match total {
        Some(tier) if tier.is_keyword() => confidence += KEYWORD_TOTAL_WEIGHT,
        Some(_) => confidence += FALLBACK_TOTAL_WEIGHT,
        None => {}
    }
    if date {
        confidence += DATE_WEIGHT;
    }
    if merchant && total.is_some() && date {
        confidence += ALL_FIELDS_BONUS;
    }

    round2(f64::min(confidence, 1.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FULL: &str = "SM SUPERMARKET\nMakati City\n03/15/2026 14:02\nSubtotal: 100.00\nTotal: PHP 150.00\nVAT: 18.00";

    #[test]
    fn test_full_receipt() {
        let fields = ReceiptExtractor::new().extract(FULL);

        assert_eq!(fields.merchant.as_deref(), Some("SM SUPERMARKET"));
        assert_eq!(fields.date.as_deref(), Some("2026-03-15"));
        assert_eq!(
            fields.total,
            Some(TotalMatch {
                value: 150.0,
                tier: TotalTier::KeywordWithCurrency
            })
        );
        assert_eq!(fields.confidence, 1.0);
    }

    #[test]
    fn test_bonus_only_with_all_three() {
        assert_eq!(score(true, Some(TotalTier::Keyword), true), 1.0);
        assert_eq!(score(false, Some(TotalTier::Keyword), true), 0.6);
        assert_eq!(score(true, None, true), 0.4);
        assert_eq!(score(true, Some(TotalTier::KeywordWithCurrency), false), 0.6);
    }

    #[test]
    fn test_fallback_weight() {
        assert_eq!(score(false, Some(TotalTier::CurrencyFallback), false), 0.3);
        assert_eq!(score(true, Some(TotalTier::CurrencyFallback), true), 0.9);
    }

    #[test]
    fn test_nothing_found_is_not_an_error() {
        let fields = ReceiptExtractor::new().extract("");
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn test_each_missing_field() {
        let extractor = ReceiptExtractor::new();

        let no_merchant = "03/15/2026 Total: PHP 150.00";
        assert_eq!(extractor.extract(no_merchant).confidence, 0.6);

        let no_date = "SM SUPERMARKET\nTotal: PHP 150.00";
        assert_eq!(extractor.extract(no_date).confidence, 0.6);

        let no_total = "SM SUPERMARKET\n03/15/2026";
        assert_eq!(extractor.extract(no_total).confidence, 0.4);
    }

    #[test]
    fn test_subtotal_line_scores_as_keyword_total() {
        let fields = ReceiptExtractor::new().extract("Subtotal: 100.00\nCash PHP 200.00");
        assert_eq!(fields.total.map(|t| t.value), Some(100.0));
        assert_eq!(fields.total.map(|t| t.tier), Some(TotalTier::Keyword));
        assert_eq!(fields.confidence, 0.6);
    }

    #[test]
    fn test_currency_fallback_contribution() {
        let fields = ReceiptExtractor::new().extract("12\nPHP 50.00 ... PHP 120.00");
        assert_eq!(fields.total.map(|t| t.value), Some(120.0));
        assert_eq!(fields.total.map(|t| t.tier), Some(TotalTier::CurrencyFallback));
        // The amounts line doubles as the merchant: 0.2 + 0.3.
        assert_eq!(fields.confidence, 0.5);
    }

    #[test]
    fn test_monotonic_confidence() {
        let tiers = [
            None,
            Some(TotalTier::CurrencyFallback),
            Some(TotalTier::Keyword),
            Some(TotalTier::KeywordWithCurrency),
        ];
        for merchant in [false, true] {
            for date in [false, true] {
                for tier in tiers {
                    let base = score(merchant, tier, date);
                    assert!(score(true, tier, date) >= base);
                    assert!(score(merchant, tier, true) >= base);
                    if tier.is_none() {
                        assert!(score(merchant, Some(TotalTier::CurrencyFallback), date) >= base);
                        assert!(score(merchant, Some(TotalTier::Keyword), date) >= base);
                    }
                }
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let extractor = ReceiptExtractor::new();
        assert_eq!(extractor.extract(FULL), extractor.extract(FULL));
    }

    #[test]
    fn test_batch_output() {
        let receipt = ReceiptExtractor::new().extract_batch(FULL);
        assert_eq!(receipt.receipt_date.as_deref(), Some("2026-03-15"));
        assert_eq!(receipt.total, Some(150.0));
        assert_eq!(receipt.raw.lines.len(), 6);
    }
}
