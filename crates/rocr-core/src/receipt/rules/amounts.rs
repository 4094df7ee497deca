//! Monetary total extraction.

use regex::Regex;
use tracing::debug;

use super::patterns::{CURRENCY_AMOUNT, TOTAL_WITH_CURRENCY, TOTAL_WITH_KEYWORD};
use super::{ExtractionMatch, FieldExtractor};

/// Which strategy located the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalTier {
    /// Total keyword followed by a currency marker and an amount.
    KeywordWithCurrency,
    /// Total keyword followed by an amount.
    Keyword,
    /// Last currency-prefixed amount in the document.
    CurrencyFallback,
}

impl TotalTier {
    /// Whether the match was anchored on a total keyword.
    pub fn is_keyword(self) -> bool {
        !matches!(self, TotalTier::CurrencyFallback)
    }
}

/// A located total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalMatch {
    pub value: f64,
    pub tier: TotalTier,
}

/// Total amount extractor.
///
/// Tiers are tried strictly in order and the first one that yields an
/// amount wins, even if a later tier would pick a different number.
pub struct TotalExtractor;

impl TotalExtractor {
    pub fn new() -> Self {
        Self
    }

    fn first_amount(pattern: &Regex, text: &str) -> Option<ExtractionMatch<f64>> {
        pattern
            .captures_iter(text)
            .find_map(|caps| Self::to_match(&caps))
    }

    fn last_amount(pattern: &Regex, text: &str) -> Option<ExtractionMatch<f64>> {
        pattern
            .captures_iter(text)
            .filter_map(|caps| Self::to_match(&caps))
            .last()
    }

    fn to_match(caps: &regex::Captures<'_>) -> Option<ExtractionMatch<f64>> {
        let full = caps.get(0)?;
        let value = parse_amount(caps.get(1)?.as_str())?;
        Some(ExtractionMatch::new(value, full.as_str()).with_position(full.start(), full.end()))
    }

    /// Locate the total and report the tier it came from.
    pub fn extract_tiered(&self, text: &str) -> Option<ExtractionMatch<TotalMatch>> {
        let found = Self::first_amount(&TOTAL_WITH_CURRENCY, text)
            .map(|m| (TotalTier::KeywordWithCurrency, m))
            .or_else(|| Self::first_amount(&TOTAL_WITH_KEYWORD, text).map(|m| (TotalTier::Keyword, m)))
            .or_else(|| {
                Self::last_amount(&CURRENCY_AMOUNT, text).map(|m| (TotalTier::CurrencyFallback, m))
            });

        found.map(|(tier, m)| {
            debug!("Total {} via {:?} from {:?}", m.value, tier, m.source);
            ExtractionMatch {
                value: TotalMatch { value: m.value, tier },
                position: m.position,
                source: m.source,
            }
        })
    }
}

impl Default for TotalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TotalExtractor {
    type Output = TotalMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_tiered(text).map(|m| m.value)
    }
}

/// Parse an amount, dropping thousands-separator commas.
pub fn parse_amount(s: &str) -> Option<f64> {
    s.replace(',', "").parse::<f64>().ok()
}
